use super::*;

peg::parser!(pub grammar ltl_parser() for str {
    rule _ = quiet!{[' ' | '\t' | '\n' | '\r']*}

    rule ident_char() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.' | '\'']

    rule keyword() = ("X" / "F" / "G" / "U" / "R" / "V" / "W"
                      / "true" / "false" / "and" / "or" / "not") !ident_char()

    rule ident() = !keyword() ['a'..='z' | 'A'..='Z' | '_'] ident_char()*

    // balanced argument text, e.g. the `(on(a, b))` in `bel(on(a, b))`
    rule args() = "(" (args() / [^ '(' | ')'])* ")"

    rule atom() -> Formula
        = name:$(quiet!{ident() args()?}) { Formula::Proposition(name.to_string()) }
        / expected!("proposition")

    rule not_op() = "!" / "~" / "not" !ident_char()
    rule or_op() = "||" / "|" / "or" !ident_char()
    rule and_op() = "&&" / "&" / "and" !ident_char()

    rule primary() -> Formula
        = "true" !ident_char() { Formula::True }
        / "false" !ident_char() { Formula::False }
        / a:atom() { a }
        / "(" _ f:expr() _ ")" { f }

    rule unary() -> Formula
        = not_op() _ f:unary() { Formula::not(f) }
        / "X" !ident_char() _ f:unary() { Formula::next(f) }
        / ("F" !ident_char() / "<>") _ f:unary() { Formula::eventually(f) }
        / ("G" !ident_char() / "[]") _ f:unary() { Formula::always(f) }
        / primary()

    rule expr() -> Formula = precedence!{
        l:(@) _ "<->" _ r:@ { Formula::iff(l, r) }
        --
        l:@ _ "->" _ r:(@) { Formula::implies(l, r) }
        --
        l:(@) _ or_op() _ r:@ { Formula::or([l, r]) }
        --
        l:(@) _ and_op() _ r:@ { Formula::and([l, r]) }
        --
        l:@ _ "U" !ident_char() _ r:(@) { Formula::until(l, r) }
        l:@ _ ("R" / "V") !ident_char() _ r:(@) { Formula::release(l, r) }
        l:@ _ "W" !ident_char() _ r:(@) { Formula::weak_until(l, r) }
        --
        u:unary() { u }
    }

    pub rule formula() -> Formula = _ f:expr() _ { f }
});

impl Formula {
    /// Parse a property. Malformed text is a `MCError::Syntax`.
    pub fn parse(text: &str) -> MCResult<Formula> {
        ltl_parser::formula(text).map_err(|e| MCError::Syntax(format!("{e} in `{text}`")))
    }

    pub fn from_string(text: &str) -> Option<Formula> {
        Formula::parse(text).ok()
    }
}

#[cfg(test)]
mod ltl_parser_test {
    use super::*;

    fn p(name: &str) -> Formula {
        Formula::prop(name)
    }

    #[test]
    fn operators() {
        assert_eq!(Formula::parse("p").unwrap(), p("p"));
        assert_eq!(Formula::parse("!p").unwrap(), Formula::not(p("p")));
        assert_eq!(Formula::parse("~ ~p").unwrap(), Formula::not(Formula::not(p("p"))));
        assert_eq!(Formula::parse("X p").unwrap(), Formula::next(p("p")));
        assert_eq!(Formula::parse("p U q").unwrap(), Formula::until(p("p"), p("q")));
        assert_eq!(Formula::parse("p R q").unwrap(), Formula::release(p("p"), p("q")));
        assert_eq!(Formula::parse("p V q").unwrap(), Formula::release(p("p"), p("q")));
        assert_eq!(Formula::parse("p W q").unwrap(), Formula::weak_until(p("p"), p("q")));
        assert_eq!(Formula::parse("F p").unwrap(), Formula::eventually(p("p")));
        assert_eq!(Formula::parse("<> p").unwrap(), Formula::eventually(p("p")));
        assert_eq!(Formula::parse("G !p").unwrap(), Formula::always(Formula::not(p("p"))));
        assert_eq!(Formula::parse("[]!p").unwrap(), Formula::always(Formula::not(p("p"))));
        assert_eq!(Formula::parse("true").unwrap(), Formula::True);
        assert_eq!(Formula::parse(" false ").unwrap(), Formula::False);
    }

    #[test]
    fn precedence_and_associativity() {
        // && binds tighter than ||, which binds tighter than ->
        assert_eq!(
            Formula::parse("a && b || c -> d").unwrap(),
            Formula::implies(Formula::or([Formula::and([p("a"), p("b")]), p("c")]), p("d"))
        );
        // -> is right associative
        assert_eq!(
            Formula::parse("a -> b -> c").unwrap(),
            Formula::implies(p("a"), Formula::implies(p("b"), p("c")))
        );
        // U is right associative and binds tighter than &&
        assert_eq!(
            Formula::parse("a U b U c && d").unwrap(),
            Formula::and([Formula::until(p("a"), Formula::until(p("b"), p("c"))), p("d")])
        );
        // prefix operators bind tightest
        assert_eq!(
            Formula::parse("!a U b").unwrap(),
            Formula::until(Formula::not(p("a")), p("b"))
        );
        assert_eq!(
            Formula::parse("a and not b or c").unwrap(),
            Formula::or([Formula::and([p("a"), Formula::not(p("b"))]), p("c")])
        );
        assert_eq!(
            Formula::parse("a <-> b").unwrap(),
            Formula::iff(p("a"), p("b"))
        );
    }

    #[test]
    fn mental_state_atoms() {
        assert_eq!(
            Formula::parse("G(bel(on(a, b)) -> F goal(clear(c)))").unwrap(),
            Formula::always(Formula::implies(
                p("bel(on(a, b))"),
                Formula::eventually(p("goal(clear(c))"))
            ))
        );
        // keywords need a word boundary
        assert_eq!(Formula::parse("Fire").unwrap(), p("Fire"));
        assert_eq!(Formula::parse("F(ire)").unwrap(), Formula::eventually(p("ire")));
        assert_eq!(Formula::parse("Xor && trueish").unwrap(), Formula::and([p("Xor"), p("trueish")]));
    }

    #[test]
    fn syntax_errors() {
        for bad in ["", "p &&", "(p", "p q", "U p", "bel(x", "p -> -> q"] {
            let res = Formula::parse(bad);
            assert!(matches!(res, Err(MCError::Syntax(_))), "{bad:?} gave {res:?}");
        }
        assert!(Formula::from_string("p U").is_none());
    }

    #[test]
    fn display_parses_back() {
        let texts = [
            "G(p -> F q)",
            "!(p U (q R !r))",
            "X X (a && b && c) || false",
            "bel(x) W !goal(y)",
            "(a <-> b) U true",
        ];
        for text in texts {
            let f = Formula::parse(text).unwrap();
            let again = Formula::parse(&format!("{f}")).unwrap();
            assert_eq!(f, again, "{text}");
        }
    }
}
