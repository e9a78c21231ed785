use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::{Account, Document, Entry, Event, DEFAULT_IDENTITY};
use crate::domain::{AccountNumber, Cents};

/// One lexical unit of a Tappio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    BraceOpen,
    BraceClose,
    Integer(i64),
    Symbol(String),
    Str(String),
}

fn calendar_date(year: i64, month: i64, day: i64) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        year.try_into().ok()?,
        month.try_into().ok()?,
        day.try_into().ok()?,
    )
}

peg::parser! {
    grammar tappio() for str {
        rule ws() = quiet!{[' ' | '\t' | '\r' | '\n']*}

        rule open() = "(" ws()
        rule close() = ")" ws()

        rule integer() -> i64
            = n:$("-"? ['0'..='9']+) ws() {? n.parse().or(Err("integer in range")) }

        rule symbol_start()
            = ['a'..='z' | 'A'..='Z' | '!' | '$' | '%' | '&' | '/' | '+' | '?' | '_' | '*']

        rule symbol() -> &'input str
            = s:$(symbol_start() (symbol_start() / "-")*) ws() { s }

        rule string_char() -> char
            = "\\" c:[_] { if c == 'n' { '\n' } else { c } }
            / c:[^ '"' | '\\'] { c }

        rule string() -> String
            = "\"" chars:string_char()* "\"" ws() { chars.into_iter().collect() }

        rule keyword(expected: &'static str)
            = s:symbol() {? if s == expected { Ok(()) } else { Err(expected) } }

        rule token() -> Token
            = open() { Token::BraceOpen }
            / close() { Token::BraceClose }
            / n:integer() { Token::Integer(n) }
            / s:symbol() { Token::Symbol(s.to_string()) }
            / s:string() { Token::Str(s) }

        pub rule tokens() -> Vec<Token>
            = ws() t:token()* { t }

        rule date() -> NaiveDate
            = open() keyword("date") y:integer() m:integer() d:integer() close() {?
                calendar_date(y, m, d).ok_or("valid calendar date")
            }

        rule money() -> Cents
            = open() keyword("money") cents:integer() close() { cents }

        // -1 marks an account group without a number
        rule account_number() -> Option<AccountNumber>
            = n:integer() {?
                match n {
                    -1 => Ok(None),
                    n if n >= 0 => Ok(Some(n)),
                    _ => Err("account number or -1"),
                }
            }

        rule account() -> Account
            = open() keyword("account") number:account_number() name:string()
              subaccounts:(open() a:account()* close() { a })? close()
            {
                Account {
                    number,
                    name,
                    subaccounts: subaccounts.unwrap_or_default(),
                }
            }

        rule entry() -> Entry
            = open() account_number:integer() cents:money() close()
            {
                Entry { account_number, cents }
            }

        rule event() -> Event
            = open() keyword("event") number:integer() date:date() description:string()
              entries:(open() e:entry()* close() { e })? close()
            {
                Event {
                    number,
                    date,
                    description,
                    entries: entries.unwrap_or_default(),
                }
            }

        rule identity() -> String
            = s:string() {? if s == DEFAULT_IDENTITY { Ok(s) } else { Err("\"Tappio\"") } }

        pub rule document() -> Document
            = ws() open()
              keyword("identity") identity:identity()
              keyword("version") version:string()
              keyword("finances")
              open() keyword("fiscal-year") name:string() begin:date() end:date()
              open() keyword("account-map") accounts:account()* close()
              open() events:event()* close()
              close()
              close()
            {
                Document {
                    identity,
                    version,
                    name,
                    begin,
                    end,
                    accounts,
                    events,
                }
            }
    }
}

/// Split Tappio source into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    tappio::tokens(source).context("Invalid Tappio syntax")
}

/// Parse a complete Tappio document.
pub fn parse(source: &str) -> Result<Document> {
    tappio::document(source).context("Invalid Tappio document")
}

#[cfg(test)]
pub(super) mod tests {
    use super::Token::{BraceClose as C, BraceOpen as O};
    use super::*;

    pub const SIMPLE_EXAMPLE: &str = concat!(
        r#"(identity "Tappio" version "versio 0.22" finances (fiscal-year "test" "#,
        r#"(date 2010 1 1) (date 2010 12 31) (account-map (account -1 "Vastaavaa" ()) "#,
        r#"(account -1 "Vastattavaa" ()) (account -1 "Tulos" ())) ()))"#,
    );

    pub const COMPLEX_EXAMPLE: &str = r#"
(identity "Tappio"
 version "versio 0.10"
 finances (fiscal-year "Esimerkkiyhdistys ery"
                       (date 2003 1 1)
                       (date 2003 12 31)
                       (account-map (account -1 "Vastaavaa" ((account 101 "Pankkitili")))
                                    (account -1 "Vastattavaa" ((account 201 "Oma pääoma")))
                                    (account -1 "Tulos" ((account 300 "Tulot")
                                                         (account 400 "Menot"))))
                       ((event 1 (date 2003 1 1) "Tilinavaus"
                               ((101 (money 123456)) (201 (money -123456)))))))
"#;

    fn int(n: i64) -> Token {
        Token::Integer(n)
    }

    fn sym(s: &str) -> Token {
        Token::Symbol(s.into())
    }

    fn text(s: &str) -> Token {
        Token::Str(s.into())
    }

    #[test]
    fn test_tokenize_integers() {
        assert_eq!(tokenize("101").unwrap(), vec![int(101)]);
        assert_eq!(tokenize("-1252").unwrap(), vec![int(-1252)]);
        assert_eq!(
            tokenize("101 102 103").unwrap(),
            vec![int(101), int(102), int(103)]
        );
        assert_eq!(tokenize("102-102").unwrap(), vec![int(102), int(-102)]);
    }

    #[test]
    fn test_tokenize_symbols() {
        assert_eq!(tokenize("foobar").unwrap(), vec![sym("foobar")]);
        assert_eq!(
            tokenize("identity version finances fiscal-year account event date money").unwrap(),
            vec![
                sym("identity"),
                sym("version"),
                sym("finances"),
                sym("fiscal-year"),
                sym("account"),
                sym("event"),
                sym("date"),
                sym("money"),
            ]
        );
    }

    #[test]
    fn test_tokenize_strings() {
        assert_eq!(tokenize(r#""foobar""#).unwrap(), vec![text("foobar")]);
        assert_eq!(tokenize(r#""foo\"bar""#).unwrap(), vec![text("foo\"bar")]);
        assert_eq!(tokenize(r#""foo\\bar""#).unwrap(), vec![text(r"foo\bar")]);
        assert_eq!(tokenize(r#""rivi\nrivi""#).unwrap(), vec![text("rivi\nrivi")]);
    }

    #[test]
    fn test_tokenize_rejects_unterminated_string() {
        assert!(tokenize(r#""foobar"#).is_err());
    }

    #[test]
    fn test_tokenize_rejects_lone_minus() {
        assert!(tokenize("- 1").is_err());
    }

    #[test]
    fn test_tokenize_complex_example() {
        let expected = vec![
            // (identity "Tappio" version "versio 0.10" finances (
            O,
            sym("identity"),
            text("Tappio"),
            sym("version"),
            text("versio 0.10"),
            sym("finances"),
            O,
            // fiscal-year "Esimerkkiyhdistys ery"
            sym("fiscal-year"),
            text("Esimerkkiyhdistys ery"),
            // (date 2003 1 1) (date 2003 12 31)
            O,
            sym("date"),
            int(2003),
            int(1),
            int(1),
            C,
            O,
            sym("date"),
            int(2003),
            int(12),
            int(31),
            C,
            // (account-map (account -1 "Vastaavaa" ((account 101 "Pankkitili")))
            O,
            sym("account-map"),
            O,
            sym("account"),
            int(-1),
            text("Vastaavaa"),
            O,
            O,
            sym("account"),
            int(101),
            text("Pankkitili"),
            C,
            C,
            C,
            // (account -1 "Vastattavaa" ((account 201 "Oma pääoma")))
            O,
            sym("account"),
            int(-1),
            text("Vastattavaa"),
            O,
            O,
            sym("account"),
            int(201),
            text("Oma pääoma"),
            C,
            C,
            C,
            // (account -1 "Tulos" ((account 300 "Tulot") (account 400 "Menot"))))
            O,
            sym("account"),
            int(-1),
            text("Tulos"),
            O,
            O,
            sym("account"),
            int(300),
            text("Tulot"),
            C,
            O,
            sym("account"),
            int(400),
            text("Menot"),
            C,
            C,
            C,
            C,
            // ((event 1 (date 2003 1 1) "Tilinavaus"
            O,
            O,
            sym("event"),
            int(1),
            O,
            sym("date"),
            int(2003),
            int(1),
            int(1),
            C,
            text("Tilinavaus"),
            // ((101 (money 123456)) (201 (money -123456)))))))
            O,
            O,
            int(101),
            O,
            sym("money"),
            int(123456),
            C,
            C,
            O,
            int(201),
            O,
            sym("money"),
            int(-123456),
            C,
            C,
            C,
            C,
            C,
            C,
            C,
        ];

        assert_eq!(tokenize(COMPLEX_EXAMPLE).unwrap(), expected);
    }

    #[test]
    fn test_parse_simple_example() {
        let document = parse(SIMPLE_EXAMPLE).unwrap();

        assert_eq!(document.identity, "Tappio");
        assert_eq!(document.version, "versio 0.22");
        assert_eq!(document.name, "test");
        assert_eq!(document.begin, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        assert_eq!(document.end, NaiveDate::from_ymd_opt(2010, 12, 31).unwrap());

        let groups: Vec<(Option<AccountNumber>, &str)> = document
            .accounts
            .iter()
            .map(|a| (a.number, a.name.as_str()))
            .collect();
        assert_eq!(
            groups,
            vec![(None, "Vastaavaa"), (None, "Vastattavaa"), (None, "Tulos")]
        );
        assert!(document.accounts.iter().all(|a| a.subaccounts.is_empty()));
        assert!(document.events.is_empty());
    }

    #[test]
    fn test_parse_complex_example() {
        let document = parse(COMPLEX_EXAMPLE).unwrap();

        assert_eq!(document.name, "Esimerkkiyhdistys ery");
        assert_eq!(document.accounts.len(), 3);
        assert_eq!(document.accounts[1].subaccounts[0].name, "Oma pääoma");

        let earnings: Vec<Option<AccountNumber>> = document.accounts[2]
            .subaccounts
            .iter()
            .map(|a| a.number)
            .collect();
        assert_eq!(earnings, vec![Some(300), Some(400)]);

        assert_eq!(
            document.events,
            vec![Event {
                number: 1,
                date: NaiveDate::from_ymd_opt(2003, 1, 1).unwrap(),
                description: "Tilinavaus".into(),
                entries: vec![
                    Entry {
                        account_number: 101,
                        cents: 123456,
                    },
                    Entry {
                        account_number: 201,
                        cents: -123456,
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_parse_rejects_other_identity() {
        let source = SIMPLE_EXAMPLE.replace("\"Tappio\"", "\"Voitto\"");
        assert!(parse(&source).is_err());
    }

    #[test]
    fn test_parse_rejects_negative_account_number() {
        let source = SIMPLE_EXAMPLE.replace("(account -1 \"Tulos\"", "(account -2 \"Tulos\"");
        assert!(parse(&source).is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_date() {
        let source = SIMPLE_EXAMPLE.replace("(date 2010 12 31)", "(date 2010 2 30)");
        assert!(parse(&source).is_err());
    }

    #[test]
    fn test_parse_rejects_trailing_input() {
        let source = format!("{} (extra)", SIMPLE_EXAMPLE);
        assert!(parse(&source).is_err());
    }
}
