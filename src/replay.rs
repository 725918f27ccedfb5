//! Line-based action scripts, for preload and test replay.
//!
//! The format is UTF-8 text, one record per line, tokens separated by
//! whitespace. Blank lines are skipped and `#` starts a comment line.
//!
//! | Record | Tokens |
//! |--------|--------|
//! | `A`    | `side type price quantity orderId` |
//! | `M`    | `orderId side price quantity` |
//! | `C`    | `orderId` |
//! | `R`    | `allCount bidLevelCount askLevelCount` (terminates the script) |
//!
//! Sides are `B` / `S`; types are the long names (`GoodTillCancel`,
//! `FillAndKill`, `Market`). `GoodForDay` and `FillOrKill` are recognised
//! tokens but unsupported by the matching core, and parse to a dedicated
//! error rather than falling back silently. Malformed records are
//! reported with their 1-based line number and never reach the book.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::orderbook::OrderBook;
use crate::types::{
    Order, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade, INVALID_PRICE,
};

// ============================================================================
// Script model
// ============================================================================

/// One parsed action record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add {
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        order_id: OrderId,
    },
    Modify {
        order_id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    },
    Cancel {
        order_id: OrderId,
    },
}

/// The terminal `R` record: the state the book is expected to be in
/// after every action has been applied. Consumed by test drivers, not by
/// the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub order_count: usize,
    pub bid_levels: usize,
    pub ask_levels: usize,
}

impl Expected {
    /// Whether `book` is in the expected state.
    pub fn matches(&self, book: &OrderBook) -> bool {
        book.len() == self.order_count
            && book.bid_level_count() == self.bid_levels
            && book.ask_level_count() == self.ask_levels
    }
}

/// A parsed script: the actions in file order, plus the expected result
/// when the script carried an `R` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub actions: Vec<Action>,
    pub expected: Option<Expected>,
}

impl Script {
    /// The largest order id the script mentions; lets an interactive
    /// caller resume id assignment past a preloaded script.
    pub fn max_order_id(&self) -> Option<OrderId> {
        self.actions
            .iter()
            .map(|action| match *action {
                Action::Add { order_id, .. }
                | Action::Modify { order_id, .. }
                | Action::Cancel { order_id } => order_id,
            })
            .max()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// A malformed record, reported against its offending token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown record `{0}`")]
    UnknownRecord(String),
    #[error("unknown side `{0}` (use B or S)")]
    UnknownSide(String),
    #[error("unknown order type `{0}`")]
    UnknownOrderType(String),
    #[error("order type `{0}` is not supported by the matching core")]
    UnsupportedOrderType(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("expected {expected} tokens, found {found}")]
    TokenCount { expected: usize, found: usize },
}

/// Failure to read or parse a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {error}")]
    Parse {
        line: usize,
        #[source]
        error: ParseError,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse a script from any buffered reader. Reading stops at the first
/// `R` record; a script without one simply has no expected result.
pub fn parse_script<R: BufRead>(reader: R) -> Result<Script, ScriptError> {
    let mut actions = Vec::new();
    let mut expected = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let record = tokens[0];
        let parsed = parse_record(record, &tokens).map_err(|error| ScriptError::Parse {
            line: index + 1,
            error,
        })?;

        match parsed {
            Record::Action(action) => actions.push(action),
            Record::Expected(result) => {
                expected = Some(result);
                break;
            }
        }
    }

    Ok(Script { actions, expected })
}

/// Parse a script from a file on disk.
pub fn load_script(path: impl AsRef<Path>) -> Result<Script, ScriptError> {
    let file = File::open(path)?;
    parse_script(BufReader::new(file))
}

enum Record {
    Action(Action),
    Expected(Expected),
}

fn parse_record(record: &str, tokens: &[&str]) -> Result<Record, ParseError> {
    match record {
        "A" => {
            expect_tokens(tokens, 6)?;
            let side = parse_side(tokens[1])?;
            let order_type = parse_order_type(tokens[2])?;
            let price = if order_type == OrderType::Market {
                // The price column is ignored for market orders; they are
                // priced by the book at peg time.
                parse_number(tokens[3])?;
                INVALID_PRICE
            } else {
                parse_number(tokens[3])? as Price
            };
            Ok(Record::Action(Action::Add {
                side,
                order_type,
                price,
                quantity: parse_number(tokens[4])?,
                order_id: parse_number(tokens[5])?,
            }))
        }
        "M" => {
            expect_tokens(tokens, 5)?;
            Ok(Record::Action(Action::Modify {
                order_id: parse_number(tokens[1])?,
                side: parse_side(tokens[2])?,
                price: parse_number(tokens[3])? as Price,
                quantity: parse_number(tokens[4])?,
            }))
        }
        "C" => {
            expect_tokens(tokens, 2)?;
            Ok(Record::Action(Action::Cancel {
                order_id: parse_number(tokens[1])?,
            }))
        }
        "R" => {
            expect_tokens(tokens, 4)?;
            Ok(Record::Expected(Expected {
                order_count: parse_number(tokens[1])? as usize,
                bid_levels: parse_number(tokens[2])? as usize,
                ask_levels: parse_number(tokens[3])? as usize,
            }))
        }
        other => Err(ParseError::UnknownRecord(other.to_string())),
    }
}

fn expect_tokens(tokens: &[&str], expected: usize) -> Result<(), ParseError> {
    if tokens.len() != expected {
        return Err(ParseError::TokenCount {
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

fn parse_side(token: &str) -> Result<Side, ParseError> {
    match token {
        "B" => Ok(Side::Buy),
        "S" => Ok(Side::Sell),
        other => Err(ParseError::UnknownSide(other.to_string())),
    }
}

fn parse_order_type(token: &str) -> Result<OrderType, ParseError> {
    match token {
        "GoodTillCancel" => Ok(OrderType::GoodTillCancel),
        "FillAndKill" => Ok(OrderType::FillAndKill),
        "Market" => Ok(OrderType::Market),
        "GoodForDay" | "FillOrKill" => Err(ParseError::UnsupportedOrderType(token.to_string())),
        other => Err(ParseError::UnknownOrderType(other.to_string())),
    }
}

fn parse_number(token: &str) -> Result<u64, ParseError> {
    token
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidNumber(token.to_string()))
}

// ============================================================================
// Running
// ============================================================================

/// Apply every action of `script` to `book` in order and return all the
/// trades that matching produced along the way.
pub fn run_script(book: &mut OrderBook, script: &Script) -> Vec<Trade> {
    let mut trades = Vec::new();
    for action in &script.actions {
        match *action {
            Action::Add {
                side,
                order_type,
                price,
                quantity,
                order_id,
            } => {
                let order = if order_type == OrderType::Market {
                    Order::market(order_id, side, quantity)
                } else {
                    Order::new(order_type, order_id, side, price, quantity)
                };
                trades.extend(book.add(order));
            }
            Action::Modify {
                order_id,
                side,
                price,
                quantity,
            } => {
                trades.extend(book.modify(OrderModify::new(order_id, side, price, quantity)));
            }
            Action::Cancel { order_id } => book.cancel(order_id),
        }
    }
    trades
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Script, ScriptError> {
        parse_script(text.as_bytes())
    }

    #[test]
    fn parses_the_three_action_kinds() {
        let script = parse(
            "A B GoodTillCancel 100 50 1\n\
             M 1 B 101 40\n\
             C 1\n\
             R 0 0 0\n",
        )
        .unwrap();

        assert_eq!(script.actions.len(), 3);
        assert_eq!(
            script.actions[0],
            Action::Add {
                side: Side::Buy,
                order_type: OrderType::GoodTillCancel,
                price: 100,
                quantity: 50,
                order_id: 1,
            }
        );
        assert_eq!(
            script.actions[1],
            Action::Modify {
                order_id: 1,
                side: Side::Buy,
                price: 101,
                quantity: 40,
            }
        );
        assert_eq!(script.actions[2], Action::Cancel { order_id: 1 });
        assert_eq!(
            script.expected,
            Some(Expected {
                order_count: 0,
                bid_levels: 0,
                ask_levels: 0,
            })
        );
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let script = parse(
            "# seed the bid side\n\
             \n\
             A B GoodTillCancel 100 50 1\n\
             \n\
             # done\n\
             R 1 1 0\n",
        )
        .unwrap();

        assert_eq!(script.actions.len(), 1);
        assert!(script.expected.is_some());
    }

    #[test]
    fn result_record_terminates_the_script() {
        let script = parse(
            "A B GoodTillCancel 100 50 1\n\
             R 1 1 0\n\
             A S GoodTillCancel 200 10 2\n",
        )
        .unwrap();

        assert_eq!(script.actions.len(), 1);
    }

    #[test]
    fn script_without_result_has_no_expectation() {
        let script = parse("A B GoodTillCancel 100 50 1\n").unwrap();
        assert!(script.expected.is_none());
    }

    #[test]
    fn market_rows_ignore_the_price_column() {
        let script = parse("A B Market 0 30 3\n").unwrap();

        assert_eq!(
            script.actions[0],
            Action::Add {
                side: Side::Buy,
                order_type: OrderType::Market,
                price: INVALID_PRICE,
                quantity: 30,
                order_id: 3,
            }
        );
    }

    #[test]
    fn unsupported_types_fail_with_their_own_error() {
        let err = parse("A B GoodForDay 100 50 1\n").unwrap_err();
        match err {
            ScriptError::Parse { line, error } => {
                assert_eq!(line, 1);
                assert_eq!(
                    error,
                    ParseError::UnsupportedOrderType("GoodForDay".to_string())
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_errors_carry_the_line_number() {
        let err = parse(
            "A B GoodTillCancel 100 50 1\n\
             A X GoodTillCancel 100 50 2\n",
        )
        .unwrap_err();

        match err {
            ScriptError::Parse { line, error } => {
                assert_eq!(line, 2);
                assert_eq!(error, ParseError::UnknownSide("X".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_token_count_is_rejected() {
        let err = parse("A B GoodTillCancel 100 50\n").unwrap_err();
        match err {
            ScriptError::Parse { error, .. } => {
                assert_eq!(
                    error,
                    ParseError::TokenCount {
                        expected: 6,
                        found: 5
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_record_letter_is_rejected() {
        let err = parse("Q 1 2 3\n").unwrap_err();
        match err {
            ScriptError::Parse { error, .. } => {
                assert_eq!(error, ParseError::UnknownRecord("Q".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn max_order_id_covers_every_record_kind() {
        let script = parse(
            "A B GoodTillCancel 100 50 4\n\
             M 9 B 101 40\n\
             C 2\n",
        )
        .unwrap();

        assert_eq!(script.max_order_id(), Some(9));
    }

    #[test]
    fn run_script_applies_actions_and_collects_trades() {
        let script = parse(
            "A B GoodTillCancel 100 50 1\n\
             A S GoodTillCancel 100 30 2\n\
             R 1 1 0\n",
        )
        .unwrap();

        let mut book = OrderBook::new();
        let trades = run_script(&mut book, &script);

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity(), 30);
        assert!(script.expected.unwrap().matches(&book));
    }
}
