//! Interactive shell over the order book.
//!
//! Commands: `add`, `modify`, `cancel`, `preload`, `book`, `orders`,
//! `help`, `quit`. Order ids are assigned by the shell's own counter,
//! which jumps past the largest id a preloaded script mentions so the two
//! id spaces never collide. Malformed commands print an error and leave
//! the book untouched.

use std::io::{self, BufRead, Write};
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use matchbook::replay::{self, ScriptError};
use matchbook::{
    Order, OrderBook, OrderId, OrderModify, OrderType, Price, Quantity, Side, Trade, INVALID_PRICE,
};

const PRICE_WIDTH: usize = 8;
const QUANTITY_WIDTH: usize = 10;

/// Whether the command loop should keep reading.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid side `{0}`: use B or S")]
    InvalidSide(String),
    #[error("invalid order type `{0}`: use GTC, FAK, or M")]
    InvalidOrderType(String),
    #[error("invalid price `{0}`: use a positive integer, or 0 for market orders")]
    InvalidPrice(String),
    #[error("invalid quantity `{0}`: use a positive integer")]
    InvalidQuantity(String),
    #[error("invalid order id `{0}`")]
    InvalidOrderId(String),
    #[error("unknown command `{0}`; type `help` for the command list")]
    UnknownCommand(String),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// What a preload did, for reporting at the prompt.
#[derive(Debug)]
pub struct PreloadOutcome {
    pub actions: usize,
    pub trades: usize,
}

/// The shell: an order book plus the id counter for `add` commands.
pub struct Repl {
    book: OrderBook,
    next_order_id: OrderId,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        Self {
            book: OrderBook::new(),
            next_order_id: 1,
        }
    }

    /// Apply a script file to the book, then resume id assignment past
    /// the largest id it mentioned.
    pub fn preload(&mut self, path: &Path) -> Result<PreloadOutcome, ScriptError> {
        let script = replay::load_script(path)?;
        if let Some(max_id) = script.max_order_id() {
            self.next_order_id = self.next_order_id.max(max_id + 1);
        }
        let trades = replay::run_script(&mut self.book, &script);
        if let Some(expected) = script.expected {
            if !expected.matches(&self.book) {
                warn!(
                    expected_orders = expected.order_count,
                    actual_orders = self.book.len(),
                    "preloaded script's result record does not match the book"
                );
            }
        }
        info!(actions = script.actions.len(), trades = trades.len(), "preload applied");
        Ok(PreloadOutcome {
            actions: script.actions.len(),
            trades: trades.len(),
        })
    }

    /// Read commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        print_header();
        print_help();

        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!("\norderbook> ");
            io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            match self.execute(line.trim()) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(error) => println!("error: {error}"),
            }
        }
        Ok(())
    }

    /// Dispatch one command line.
    pub fn execute(&mut self, line: &str) -> Result<Flow, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            return Ok(Flow::Continue);
        };

        match command {
            "quit" | "exit" => {
                println!("Goodbye!");
                Ok(Flow::Quit)
            }
            "help" => {
                print_help();
                Ok(Flow::Continue)
            }
            "book" => {
                self.print_book();
                Ok(Flow::Continue)
            }
            "orders" => {
                self.print_orders();
                Ok(Flow::Continue)
            }
            "add" => self.cmd_add(&tokens[1..]),
            "modify" => self.cmd_modify(&tokens[1..]),
            "cancel" => self.cmd_cancel(&tokens[1..]),
            "preload" => self.cmd_preload(&tokens[1..]),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    fn cmd_add(&mut self, args: &[&str]) -> Result<Flow, CommandError> {
        if args.len() != 4 {
            return Err(CommandError::Usage("add <side> <type> <price> <quantity>"));
        }
        let side = parse_side(args[0])?;
        let order_type = parse_order_type(args[1])?;
        let price = parse_price(args[2])?;
        let quantity = parse_quantity(args[3])?;

        let order_id = self.next_order_id;
        let order = match order_type {
            OrderType::Market => Order::market(order_id, side, quantity),
            _ => {
                if price == INVALID_PRICE {
                    return Err(CommandError::InvalidPrice(args[2].to_string()));
                }
                Order::new(order_type, order_id, side, price, quantity)
            }
        };
        self.next_order_id += 1;

        let trades = self.book.add(order);
        if trades.is_empty() && !self.book.contains(order_id) {
            println!("Order {order_id} not admitted.");
        } else {
            println!("Order added. ID: {order_id}");
        }
        print_trades(&trades);
        Ok(Flow::Continue)
    }

    fn cmd_modify(&mut self, args: &[&str]) -> Result<Flow, CommandError> {
        if args.len() != 4 {
            return Err(CommandError::Usage("modify <id> <side> <price> <quantity>"));
        }
        let order_id = parse_order_id(args[0])?;
        let side = parse_side(args[1])?;
        let price = parse_price(args[2])?;
        let quantity = parse_quantity(args[3])?;
        if price == INVALID_PRICE {
            return Err(CommandError::InvalidPrice(args[2].to_string()));
        }

        if !self.book.contains(order_id) {
            println!("Order {order_id} not found.");
            return Ok(Flow::Continue);
        }

        let trades = self
            .book
            .modify(OrderModify::new(order_id, side, price, quantity));
        println!("Order {order_id} modified.");
        print_trades(&trades);
        Ok(Flow::Continue)
    }

    fn cmd_cancel(&mut self, args: &[&str]) -> Result<Flow, CommandError> {
        if args.len() != 1 {
            return Err(CommandError::Usage("cancel <id>"));
        }
        let order_id = parse_order_id(args[0])?;

        if self.book.contains(order_id) {
            self.book.cancel(order_id);
            println!("Order {order_id} cancelled.");
        } else {
            println!("Order {order_id} not found.");
        }
        Ok(Flow::Continue)
    }

    fn cmd_preload(&mut self, args: &[&str]) -> Result<Flow, CommandError> {
        if args.len() != 1 {
            return Err(CommandError::Usage("preload <filename>"));
        }
        let outcome = self.preload(Path::new(args[0]))?;
        println!(
            "Preloaded {} actions ({} trades).",
            outcome.actions, outcome.trades
        );
        Ok(Flow::Continue)
    }

    fn print_book(&self) {
        let snapshot = self.book.snapshot();

        println!("{:-<33}", "");
        println!(
            "{:>PRICE_WIDTH$} {:>QUANTITY_WIDTH$}  SIDE",
            "PRICE", "QUANTITY"
        );
        println!("{:-<33}", "");

        // Asks highest first, so the best ask sits just above the bids.
        for level in snapshot.asks.iter().rev() {
            println!(
                "{:>PRICE_WIDTH$} {:>QUANTITY_WIDTH$}  SELL",
                level.price, level.quantity
            );
        }
        println!("{:-<33}", "");
        for level in &snapshot.bids {
            println!(
                "{:>PRICE_WIDTH$} {:>QUANTITY_WIDTH$}  BUY",
                level.price, level.quantity
            );
        }
        println!("{:-<33}", "");
        println!("Total orders: {}", self.book.len());
    }

    fn print_orders(&self) {
        let mut orders: Vec<&Order> = self.book.orders().collect();
        orders.sort_by_key(|order| order.id());

        println!("{:-<72}", "");
        println!(
            "{:>8} {:>6} {:>16} {:>8} {:>10} {:>10} {:>8}",
            "ID", "SIDE", "TYPE", "PRICE", "INITIAL", "REMAINING", "FILLED"
        );
        println!("{:-<72}", "");
        for order in orders {
            println!(
                "{:>8} {:>6} {:>16} {:>8} {:>10} {:>10} {:>8}",
                order.id(),
                order.side().to_string(),
                order.order_type().to_string(),
                order.price(),
                order.initial_quantity(),
                order.remaining_quantity(),
                order.filled_quantity()
            );
        }
        println!("{:-<72}", "");
        println!("Total orders: {}", self.book.len());
    }
}

fn print_trades(trades: &[Trade]) {
    if trades.is_empty() {
        return;
    }
    println!("Trades executed: {}", trades.len());
    for trade in trades {
        println!(
            "  bid {} @ {} / ask {} @ {} x {}",
            trade.bid().order_id,
            trade.bid().price,
            trade.ask().order_id,
            trade.ask().price,
            trade.quantity()
        );
    }
}

fn print_header() {
    println!("{:=<60}", "");
    println!("{:^60}", "ORDER BOOK");
    println!("{:=<60}", "");
}

fn print_help() {
    println!("\nCommands:");
    println!("  add <side> <type> <price> <quantity>   Add a new order");
    println!("  modify <id> <side> <price> <quantity>  Replace an existing order");
    println!("  cancel <id>                            Cancel an order");
    println!("  preload <filename>                     Apply an action script");
    println!("  book                                   Show the depth of book");
    println!("  orders                                 Show all resting orders");
    println!("  help                                   Show this help");
    println!("  quit                                   Exit");
    println!("\nSide: B (buy) or S (sell)");
    println!("Type: GTC (good till cancel), FAK (fill and kill), M (market)");
    println!("Price: positive integer ticks; 0 for market orders\n");
}

// ============================================================================
// Token parsing
// ============================================================================

fn parse_side(token: &str) -> Result<Side, CommandError> {
    match token {
        "B" | "b" => Ok(Side::Buy),
        "S" | "s" => Ok(Side::Sell),
        other => Err(CommandError::InvalidSide(other.to_string())),
    }
}

fn parse_order_type(token: &str) -> Result<OrderType, CommandError> {
    match token.to_ascii_uppercase().as_str() {
        "GTC" => Ok(OrderType::GoodTillCancel),
        "FAK" => Ok(OrderType::FillAndKill),
        "M" => Ok(OrderType::Market),
        _ => Err(CommandError::InvalidOrderType(token.to_string())),
    }
}

fn parse_price(token: &str) -> Result<Price, CommandError> {
    if token == "0" || token.is_empty() {
        return Ok(INVALID_PRICE);
    }
    match token.parse::<Price>() {
        Ok(price) if price > 0 => Ok(price),
        _ => Err(CommandError::InvalidPrice(token.to_string())),
    }
}

fn parse_quantity(token: &str) -> Result<Quantity, CommandError> {
    match token.parse::<Quantity>() {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(CommandError::InvalidQuantity(token.to_string())),
    }
}

fn parse_order_id(token: &str) -> Result<OrderId, CommandError> {
    token
        .parse::<OrderId>()
        .map_err(|_| CommandError::InvalidOrderId(token.to_string()))
}

// ============================================================================
// Unit Tests
// ============================================================================
