use super::*;

peg::parser!(pub grammar pred_parser() for str {
    rule _ = quiet!{[' ' | '\t' | '\n' | '\r']*}

    rule ident_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.']

    rule true_kw() = ("true" / "TRUE") !ident_char()
    rule false_kw() = ("false" / "FALSE") !ident_char()

    rule name() -> String
        = !(true_kw() / false_kw()) n:$(['a'..='z' | 'A'..='Z' | '_'] ident_char()*) { n.to_string() }
        / expected!("variable")

    rule int() -> i32
        = n:$("-"? ['0'..='9']+) {? n.parse().or(Err("32 bit integer")) }

    rule constant() -> Value
        = true_kw() { Value::Bool(true) }
        / false_kw() { Value::Bool(false) }
        / i:int() { Value::Int(i) }

    pub rule value() -> PredicateValue
        = c:constant() { PredicateValue::Value(c) }
        / n:name() { PredicateValue::var(&n) }

    rule atom() -> Predicate
        = l:value() _ "==" _ r:value() { Predicate::EQ(l, r) }
        / l:value() _ "!=" _ r:value() { Predicate::NEQ(l, r) }
        / true_kw() { Predicate::TRUE }
        / false_kw() { Predicate::FALSE }
        / n:name() { Predicate::is_true(&n) }
        / "(" _ p:pred() _ ")" { p }

    rule pred() -> Predicate = precedence!{
        a:@ _ "->" _ b:(@) { Predicate::OR(vec![Predicate::NOT(Box::new(a)), b]) }
        --
        a:(@) _ "||" _ b:@ { Predicate::OR(vec![a, b]) }
        --
        a:(@) _ "&&" _ b:@ { Predicate::AND(vec![a, b]) }
        --
        "!" _ p:@ { Predicate::NOT(Box::new(p)) }
        --
        a:atom() { a }
    }

    pub rule predicate() -> Predicate = _ p:pred() _ { p }

    pub rule action() -> Action
        = _ n:name() _ ":=" _ "?" _ { Action::new(&n, Compute::Any) }
        / _ n:name() _ ":=" _ v:value() _ !['=' | '!' | '&' | '|' | '-'] { Action::new(&n, Compute::Value(v)) }
        / _ n:name() _ ":=" _ p:pred() _ { Action::new(&n, Compute::Predicate(p)) }
});
