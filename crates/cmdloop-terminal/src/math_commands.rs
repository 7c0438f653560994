//! Demo arithmetic commands: addf, evalf, subf, mulf, divf.
//!
//! Registered only when `demo_commands` is enabled.

use cmdloop_types::error::Result;

use crate::command::{Category, Command, Context, Outcome};
use crate::registry::CommandRegistry;

/// Category shared by the demo commands.
pub const MATH_CATEGORY: &str = "Math";

const NOT_ENOUGH: &str = "You must provide at least two numbers!";
const NOT_NUMBERS: &str = "You must provide all numbers as floats/integers!";

/// Register the arithmetic commands.
///
/// `evalf` claims the alias `ef`, which `exitf` already owns when the
/// built-ins are registered first.
pub fn register_math_commands(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(fold_command(
        "addf",
        &["additionf", "af"],
        "Adds as many numbers as provided together.",
        "Sum",
        |a, b| a + b,
    )?);
    reg.register(eval_command()?);
    reg.register(fold_command(
        "subf",
        &["subtractf", "sf"],
        "Subtracts every following number from the first.",
        "Difference",
        |a, b| a - b,
    )?);
    reg.register(fold_command(
        "mulf",
        &["multiplyf", "mf"],
        "Multiplies as many numbers as provided together.",
        "Product",
        |a, b| a * b,
    )?);
    reg.register(
        Command::builder("divf")
            .aliases(["dividef", "divisionf", "df"])
            .help("Divides the first number by every following number.")
            .usage("[value] ...")
            .category(Category::new(MATH_CATEGORY))
            .handler(run_divide)
            .build()?,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// addf / subf / mulf
// ---------------------------------------------------------------------------

fn fold_command(
    name: &str,
    aliases: &[&str],
    help: &str,
    label: &'static str,
    op: fn(f64, f64) -> f64,
) -> Result<Command> {
    Command::builder(name)
        .aliases(aliases.iter().copied())
        .help(help)
        .usage("[value] ...")
        .category(Category::new(MATH_CATEGORY))
        .handler(move |ctx: &mut Context<'_>| {
            let Some(numbers) = read_numbers(ctx)? else {
                return Ok(Outcome::Done);
            };
            let result = numbers[1..].iter().fold(numbers[0], |acc, n| op(acc, *n));
            ctx.replyln(&format!("{label}: {result}"))?;
            Ok(Outcome::Done)
        })
        .build()
}

/// Parse at least two numbers from the positional arguments, replying with a
/// usage hint and returning `None` when that fails.
fn read_numbers(ctx: &mut Context<'_>) -> Result<Option<Vec<f64>>> {
    let parsed: std::result::Result<Vec<f64>, _> =
        ctx.input().args().iter().map(|a| a.parse::<f64>()).collect();
    match parsed {
        Ok(numbers) if numbers.len() >= 2 => Ok(Some(numbers)),
        Ok(_) => {
            ctx.replyln(NOT_ENOUGH)?;
            Ok(None)
        },
        Err(_) => {
            ctx.replyln(NOT_NUMBERS)?;
            Ok(None)
        },
    }
}

// ---------------------------------------------------------------------------
// divf
// ---------------------------------------------------------------------------

fn run_divide(ctx: &mut Context<'_>) -> Result<Outcome> {
    let Some(numbers) = read_numbers(ctx)? else {
        return Ok(Outcome::Done);
    };
    if numbers[1..].contains(&0.0) {
        ctx.replyln("You cannot divide by zero!")?;
        return Ok(Outcome::Done);
    }
    let result = numbers[1..].iter().fold(numbers[0], |acc, n| acc / n);
    ctx.replyln(&format!("Quotient: {result}"))?;
    Ok(Outcome::Done)
}

// ---------------------------------------------------------------------------
// evalf
// ---------------------------------------------------------------------------

fn eval_command() -> Result<Command> {
    Command::builder("evalf")
        .aliases(["evaluatef", "ef"])
        .help("Evaluates an arithmetic expression.")
        .usage("[expression]")
        .category(Category::new(MATH_CATEGORY))
        .handler(|ctx: &mut Context<'_>| {
            let expr = ctx.input().positional().to_string();
            if expr.is_empty() {
                ctx.replyln("You must provide an expression to evaluate!")?;
                return Ok(Outcome::Done);
            }
            match evaluate(&expr) {
                Ok(value) => ctx.replyln(&format!("Result: {value}"))?,
                Err(reason) => ctx.replyln(&format!("Invalid expression: {reason}"))?,
            }
            Ok(Outcome::Done)
        })
        .build()
}

/// Evaluate `+ - * /` with unary minus and parentheses.
pub fn evaluate(expr: &str) -> std::result::Result<f64, String> {
    let mut parser = ExprParser {
        chars: expr.chars().filter(|c| !c.is_whitespace()).collect(),
        pos: 0,
    };
    let value = parser.expr(0)?;
    if let Some(c) = parser.peek() {
        return Err(format!("unexpected '{c}' at position {}", parser.pos + 1));
    }
    Ok(value)
}

/// Nesting limit for parentheses and unary minus.
const MAX_DEPTH: usize = 64;

struct ExprParser {
    chars: Vec<char>,
    pos: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn expr(&mut self, depth: usize) -> std::result::Result<f64, String> {
        let mut value = self.term(depth)?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term(depth)?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self, depth: usize) -> std::result::Result<f64, String> {
        let mut value = self.factor(depth)?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.factor(depth)?;
            if op == '/' {
                if rhs == 0.0 {
                    return Err("division by zero".to_string());
                }
                value /= rhs;
            } else {
                value *= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self, depth: usize) -> std::result::Result<f64, String> {
        if depth > MAX_DEPTH {
            return Err("expression nested too deeply".to_string());
        }
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.factor(depth + 1)?)
            },
            Some('(') => {
                self.pos += 1;
                let value = self.expr(depth + 1)?;
                if self.peek() != Some(')') {
                    return Err("missing ')'".to_string());
                }
                self.pos += 1;
                Ok(value)
            },
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| c.is_ascii_digit() || c == '.')
                {
                    self.pos += 1;
                }
                let text: String = self.chars[start..self.pos].iter().collect();
                text.parse::<f64>()
                    .map_err(|_| format!("invalid number '{text}'"))
            },
            Some(c) => Err(format!("unexpected '{c}' at position {}", self.pos + 1)),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}
