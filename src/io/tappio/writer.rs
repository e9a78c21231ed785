use std::fmt::Display;
use std::io::{self, Write};

use chrono::{Datelike, NaiveDate};

use super::{Account, Document, Entry, Event};
use crate::domain::Cents;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece {
    Open,
    Close,
    Atom,
}

/// Serializes a document into Tappio syntax.
///
/// Compact output keeps the whole document on one line. Pretty output breaks
/// lines with CRLF and indents nested lists.
pub struct Writer<W: Write> {
    out: W,
    pretty: bool,
    depth: usize,
    prev: Option<Piece>,
    newline_queued: bool,
}

impl<W: Write> Writer<W> {
    pub fn new(out: W, pretty: bool) -> Self {
        Self {
            out,
            pretty,
            depth: 0,
            prev: None,
            newline_queued: false,
        }
    }

    pub fn write_document(&mut self, document: &Document) -> io::Result<()> {
        self.open()?;
        self.atom("identity")?;
        self.string(&document.identity)?;
        self.atom("version")?;
        self.string(&document.version)?;
        self.atom("finances")?;
        self.indent();

        self.open()?;
        self.atom("fiscal-year")?;
        self.string(&document.name)?;
        self.date(document.begin)?;
        self.date(document.end)?;
        self.indent();

        self.accounts(&document.accounts)?;
        self.new_line();
        self.events(&document.events)?;

        self.dedent();
        self.close()?;
        self.dedent();
        self.close()?;

        if self.pretty {
            self.out.write_all(b"\r\n")?;
        }
        self.out.flush()
    }

    fn accounts(&mut self, accounts: &[Account]) -> io::Result<()> {
        self.open()?;
        self.atom("account-map")?;
        self.indent();
        for account in accounts {
            self.account(account)?;
            self.new_line();
        }
        self.dedent();
        self.close()
    }

    fn account(&mut self, account: &Account) -> io::Result<()> {
        self.open()?;
        self.atom("account")?;
        self.atom(account.number.unwrap_or(-1))?;
        self.string(&account.name)?;

        self.open()?;
        if !account.subaccounts.is_empty() {
            self.indent();
            for subaccount in &account.subaccounts {
                self.account(subaccount)?;
                self.new_line();
            }
            self.dedent();
        }
        self.close()?;

        self.close()
    }

    fn events(&mut self, events: &[Event]) -> io::Result<()> {
        self.open()?;
        self.indent();
        for event in events {
            self.event(event)?;
            self.new_line();
        }
        self.dedent();
        self.close()
    }

    fn event(&mut self, event: &Event) -> io::Result<()> {
        self.open()?;
        self.atom("event")?;
        self.atom(event.number)?;
        self.date(event.date)?;
        self.string(&event.description)?;

        self.open()?;
        if !event.entries.is_empty() {
            self.indent();
            for entry in &event.entries {
                self.entry(entry)?;
                self.new_line();
            }
            self.dedent();
        }
        self.close()?;

        self.close()
    }

    fn entry(&mut self, entry: &Entry) -> io::Result<()> {
        self.open()?;
        self.atom(entry.account_number)?;
        self.money(entry.cents)?;
        self.close()
    }

    fn date(&mut self, date: NaiveDate) -> io::Result<()> {
        self.open()?;
        self.atom("date")?;
        self.atom(date.year())?;
        self.atom(date.month())?;
        self.atom(date.day())?;
        self.close()
    }

    fn money(&mut self, cents: Cents) -> io::Result<()> {
        self.open()?;
        self.atom("money")?;
        self.atom(cents)?;
        self.close()
    }

    fn string(&mut self, value: &str) -> io::Result<()> {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for ch in value.chars() {
            match ch {
                '\n' => quoted.push_str("\\n"),
                '"' => quoted.push_str("\\\""),
                '\\' => quoted.push_str("\\\\"),
                _ => quoted.push(ch),
            }
        }
        quoted.push('"');
        self.atom(quoted)
    }

    fn open(&mut self) -> io::Result<()> {
        self.piece(Piece::Open, "(")
    }

    fn close(&mut self) -> io::Result<()> {
        self.piece(Piece::Close, ")")
    }

    fn atom(&mut self, value: impl Display) -> io::Result<()> {
        self.piece(Piece::Atom, value)
    }

    fn piece(&mut self, piece: Piece, text: impl Display) -> io::Result<()> {
        if self.newline_queued {
            self.newline_queued = false;
            if self.pretty {
                write!(self.out, "\r\n{}", INDENT.repeat(self.depth))?;
                self.prev = None;
            }
        }

        let spaced = match (self.prev, piece) {
            (None, _) => false,
            (Some(Piece::Close), Piece::Open) => true,
            (Some(prev), piece) => prev != Piece::Open && piece != Piece::Close,
        };
        if spaced {
            self.out.write_all(b" ")?;
        }
        write!(self.out, "{}", text)?;

        self.prev = Some(piece);
        Ok(())
    }

    fn new_line(&mut self) {
        self.newline_queued = true;
    }

    fn indent(&mut self) {
        self.depth += 1;
        self.new_line();
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.new_line();
    }
}
