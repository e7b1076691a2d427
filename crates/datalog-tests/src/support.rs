//! Small constructors shared by the tests

use datalog::{Atom, FactDatabase, Literal, Query, Rule, Term};

/// Uppercase or `_` names are variables, anything else an atom constant
pub fn term(name: &str) -> Term {
    if name.starts_with(|c: char| c.is_uppercase() || c == '_') {
        Term::var(name)
    } else {
        Term::atom(name)
    }
}

pub fn atom(name: &str, args: &[&str]) -> Atom {
    Atom::new(name, args.iter().map(|a| term(a)).collect())
}

pub fn pos(name: &str, args: &[&str]) -> Literal {
    Literal::positive(atom(name, args))
}

pub fn neg(name: &str, args: &[&str]) -> Literal {
    Literal::negative(atom(name, args))
}

pub fn rule(head: Atom, body: Vec<Literal>) -> Rule {
    Rule::new(head, body)
}

pub fn query(body: Vec<Literal>) -> Query {
    Query::new(body)
}

pub fn facts(atoms: Vec<Atom>) -> FactDatabase {
    let mut db = FactDatabase::new();
    for fact in &atoms {
        db.insert_atom(fact)
            .expect("test facts have consistent arities");
    }
    db
}

/// Integer facts for a binary predicate
pub fn int_pairs(db: &mut FactDatabase, name: &str, pairs: &[(i64, i64)]) {
    for &(a, b) in pairs {
        db.insert_atom(&Atom::new(name, vec![Term::int(a), Term::int(b)]))
            .expect("binary facts");
    }
}

pub fn same_generation_rules() -> Vec<Rule> {
    vec![
        rule(atom("sg", &["X", "Y"]), vec![pos("flat", &["X", "Y"])]),
        rule(
            atom("sg", &["X", "Y"]),
            vec![
                pos("up", &["X", "Z1"]),
                pos("sg", &["Z1", "Z2"]),
                pos("flat", &["Z2", "Z3"]),
                pos("sg", &["Z3", "Z4"]),
                pos("down", &["Z4", "Y"]),
            ],
        ),
    ]
}

pub fn ancestor_rules() -> Vec<Rule> {
    vec![
        rule(atom("ancestor", &["X", "Y"]), vec![pos("parent", &["X", "Y"])]),
        rule(
            atom("ancestor", &["X", "Z"]),
            vec![pos("ancestor", &["X", "Y"]), pos("parent", &["Y", "Z"])],
        ),
    ]
}
