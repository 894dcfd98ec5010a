//! Interactive session state and command parsing
//!
//! The session holds the current dashboard and its inputs. A command either
//! changes one input (and asks for a re-render), or controls the session.
//! Changes are applied to a copy and checked before they are kept, so a
//! rejected command leaves the previous inputs untouched.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::dashboard::inputs::{AMOUNT_SLIDER, YEARS_SLIDER};
use crate::dashboard::{DashboardKind, Mode, PortfolioInputs, ProjectionInputs};
use crate::error::{DashboardError, Result};
use crate::market::{normalize_symbol, parse_symbol_list};
use super::readline::Completions;

/// Parsed session command
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Re-render with the current inputs: `show`
    Show,
    /// Switch dashboard: `dashboard <stocks|crypto|fund|currency>`
    Dashboard(DashboardKind),
    /// Portfolio symbols: `symbols AAPL,MSFT`
    Symbols(Vec<String>),
    /// Portfolio range start: `from 2023-01-01`
    From(NaiveDate),
    /// Portfolio range end: `to 2024-01-01`
    To(NaiveDate),
    /// Allocation percentage: `alloc AAPL 20`
    Alloc { symbol: String, percent: u32 },
    /// Alert threshold: `threshold 150`
    Threshold(Decimal),
    /// Projection symbol: `symbol VTSAX`
    Symbol(String),
    /// Projection amount: `amount 25000`
    Amount(u32),
    /// Projection horizon: `years 3`
    Years(u32),
    /// Projection window end: `end 2024-06-30`
    End(NaiveDate),
    Help,
    Exit,
}

/// What the loop does after a command was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Render,
    Help,
    Exit,
}

fn invalid(message: impl Into<String>) -> DashboardError {
    DashboardError::InvalidInput(message.into())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| invalid(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}

fn parse_number<T: FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| invalid(format!("invalid {} '{}'", what, value)))
}

fn single_arg<'a>(rest: &[&'a str], usage: &str) -> Result<&'a str> {
    match rest {
        [value] => Ok(*value),
        _ => Err(invalid(format!("Usage: {}", usage))),
    }
}

impl SessionCommand {
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.split_whitespace();
        let cmd = parts
            .next()
            .ok_or_else(|| invalid("Empty command. Type `help` for commands."))?
            .to_lowercase();
        let rest: Vec<&str> = parts.collect();

        let single = |usage: &str| single_arg(&rest, usage);

        match cmd.as_str() {
            "show" | "refresh" => Ok(SessionCommand::Show),
            "help" | "?" => Ok(SessionCommand::Help),
            "exit" | "quit" => Ok(SessionCommand::Exit),
            "dashboard" => {
                let kind = single("dashboard <stocks|crypto|fund|currency>")?;
                DashboardKind::from_str(kind)
                    .map(SessionCommand::Dashboard)
                    .map_err(invalid)
            }
            "symbols" => {
                let symbols = parse_symbol_list(&rest.join(" "));
                if symbols.is_empty() {
                    return Err(invalid("Usage: symbols <SYM,SYM,...>"));
                }
                Ok(SessionCommand::Symbols(symbols))
            }
            "from" => Ok(SessionCommand::From(parse_date(single("from <YYYY-MM-DD>")?)?)),
            "to" => Ok(SessionCommand::To(parse_date(single("to <YYYY-MM-DD>")?)?)),
            "alloc" => match rest.as_slice() {
                [symbol, percent] => Ok(SessionCommand::Alloc {
                    symbol: normalize_symbol(symbol),
                    percent: parse_number(percent.trim_end_matches('%'), "percentage")?,
                }),
                _ => Err(invalid("Usage: alloc <SYMBOL> <PERCENT>")),
            },
            "threshold" => Ok(SessionCommand::Threshold(parse_number(
                single("threshold <amount>")?,
                "threshold",
            )?)),
            "symbol" => Ok(SessionCommand::Symbol(normalize_symbol(single(
                "symbol <SYMBOL>",
            )?))),
            "amount" => Ok(SessionCommand::Amount(parse_number(
                single("amount <n>")?,
                "amount",
            )?)),
            "years" => Ok(SessionCommand::Years(parse_number(
                single("years <n>")?,
                "number of years",
            )?)),
            "end" => Ok(SessionCommand::End(parse_date(single("end <YYYY-MM-DD>")?)?)),
            other => Err(invalid(format!(
                "Unknown command '{}'. Type `help` for commands.",
                other
            ))),
        }
    }

    fn mode(&self) -> Option<Mode> {
        match self {
            SessionCommand::Symbols(_)
            | SessionCommand::From(_)
            | SessionCommand::To(_)
            | SessionCommand::Alloc { .. }
            | SessionCommand::Threshold(_) => Some(Mode::Portfolio),
            SessionCommand::Symbol(_)
            | SessionCommand::Amount(_)
            | SessionCommand::Years(_)
            | SessionCommand::End(_) => Some(Mode::Projection),
            _ => None,
        }
    }
}

/// Current dashboard and the inputs of both modes
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub kind: DashboardKind,
    pub portfolio: PortfolioInputs,
    pub projection: ProjectionInputs,
    today: NaiveDate,
}

impl SessionState {
    pub fn new(kind: DashboardKind, today: NaiveDate) -> Self {
        Self {
            kind,
            portfolio: PortfolioInputs::defaults(kind, today),
            projection: ProjectionInputs::defaults(kind, today),
            today,
        }
    }

    pub fn mode(&self) -> Mode {
        self.kind.profile().mode
    }

    /// Apply a command. Input changes are checked before they replace the
    /// current inputs.
    pub fn apply(&mut self, command: SessionCommand) -> Result<Outcome> {
        if let Some(mode) = command.mode() {
            if mode != self.mode() {
                return Err(invalid(format!(
                    "'{}' dashboard has no such input; type `help` for its commands",
                    self.kind
                )));
            }
        }

        match command {
            SessionCommand::Show => return Ok(Outcome::Render),
            SessionCommand::Help => return Ok(Outcome::Help),
            SessionCommand::Exit => return Ok(Outcome::Exit),
            SessionCommand::Dashboard(kind) => {
                *self = SessionState::new(kind, self.today);
                return Ok(Outcome::Render);
            }
            _ => {}
        }

        if self.mode() == Mode::Portfolio {
            let mut next = self.portfolio.clone();
            match command {
                SessionCommand::Symbols(symbols) => next.symbols = symbols,
                SessionCommand::From(date) => next.from = date,
                SessionCommand::To(date) => next.to = date,
                SessionCommand::Alloc { symbol, percent } => {
                    next.set_allocation(&symbol, percent)?
                }
                SessionCommand::Threshold(value) => next.threshold = value,
                _ => {}
            }
            next.validate()?;
            self.portfolio = next;
        } else {
            let mut next = self.projection.clone();
            match command {
                SessionCommand::Symbol(symbol) => next.symbol = symbol,
                SessionCommand::Amount(amount) => next.amount = amount,
                SessionCommand::Years(years) => next.years = years,
                SessionCommand::End(date) => next.end_date = date,
                _ => {}
            }
            next.parameters(self.kind)?;
            self.projection = next;
        }
        Ok(Outcome::Render)
    }

    /// Help text for the current dashboard
    pub fn help(&self) -> String {
        let mut lines = vec![
            format!("{} commands:", self.kind.profile().title),
            "  show                       - Re-render with the current inputs".to_string(),
            "  dashboard <name>           - Switch to stocks, crypto, fund or currency"
                .to_string(),
        ];
        match self.mode() {
            Mode::Portfolio => lines.extend([
                "  symbols <SYM,SYM,...>      - Symbols to fetch".to_string(),
                "  from <YYYY-MM-DD>          - Start date".to_string(),
                "  to <YYYY-MM-DD>            - End date".to_string(),
                "  alloc <SYM> <0-100>        - Allocation percentage".to_string(),
                "  threshold <amount>         - Alert threshold".to_string(),
            ]),
            Mode::Projection => lines.extend([
                format!(
                    "  symbol <SYM>               - One of: {}",
                    self.kind.profile().choices.join(", ")
                ),
                format!(
                    "  amount <n>                 - {} to {}, steps of {}",
                    AMOUNT_SLIDER.min, AMOUNT_SLIDER.max, AMOUNT_SLIDER.step
                ),
                format!(
                    "  years <n>                  - {} to {}",
                    YEARS_SLIDER.min, YEARS_SLIDER.max
                ),
                "  end <YYYY-MM-DD>           - Last date of history used".to_string(),
            ]),
        }
        lines.push("  help                       - Show this help".to_string());
        lines.push("  exit                       - Leave the session".to_string());
        lines.join("\n")
    }
}

/// Completion table: every command, plus dashboard names and the fixed
/// symbol choices as arguments
pub fn completions() -> Completions {
    let mut table = [
        "show", "symbols", "from", "to", "alloc", "threshold", "amount", "years", "end", "help",
        "exit",
    ]
    .iter()
    .fold(Completions::new(), |table, cmd| table.command(cmd));

    for kind in DashboardKind::ALL {
        table = table.argument("dashboard", kind.as_str());
        for choice in kind.profile().choices {
            table = table.argument("symbol", choice);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::readline::Readline;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("show").unwrap(), SessionCommand::Show);
        assert_eq!(
            SessionCommand::parse("symbols aapl, msft").unwrap(),
            SessionCommand::Symbols(vec!["AAPL".to_string(), "MSFT".to_string()])
        );
        assert_eq!(
            SessionCommand::parse("alloc aapl 20%").unwrap(),
            SessionCommand::Alloc {
                symbol: "AAPL".to_string(),
                percent: 20
            }
        );
        assert_eq!(
            SessionCommand::parse("threshold 150.25").unwrap(),
            SessionCommand::Threshold(dec!(150.25))
        );
        assert_eq!(
            SessionCommand::parse("DASHBOARD fx").unwrap(),
            SessionCommand::Dashboard(DashboardKind::Currency)
        );
        assert_eq!(SessionCommand::parse("quit").unwrap(), SessionCommand::Exit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(SessionCommand::parse("").is_err());
        assert!(SessionCommand::parse("from 01/02/2024").is_err());
        assert!(SessionCommand::parse("amount lots").is_err());
        assert!(SessionCommand::parse("alloc AAPL").is_err());
        assert!(SessionCommand::parse("frobnicate").is_err());
    }

    #[test]
    fn test_portfolio_changes_apply() {
        let mut state = SessionState::new(DashboardKind::Stocks, today());
        let outcome = state
            .apply(SessionCommand::parse("alloc MSFT 40").unwrap())
            .unwrap();
        assert_eq!(outcome, Outcome::Render);
        assert_eq!(state.portfolio.allocations.get("MSFT"), Some(&40));

        state
            .apply(SessionCommand::parse("from 2023-05-01").unwrap())
            .unwrap();
        assert_eq!(
            state.portfolio.from,
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
        );
    }

    #[test]
    fn test_rejected_change_keeps_previous_inputs() {
        let mut state = SessionState::new(DashboardKind::Stocks, today());
        let before = state.clone();

        assert!(state
            .apply(SessionCommand::parse("from 2030-01-01").unwrap())
            .is_err());
        assert!(state
            .apply(SessionCommand::parse("alloc AAPL 101").unwrap())
            .is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_projection_changes_checked_against_sliders() {
        let mut state = SessionState::new(DashboardKind::Fund, today());
        assert!(state
            .apply(SessionCommand::parse("amount 1500").unwrap())
            .is_err());
        assert!(state
            .apply(SessionCommand::parse("years 11").unwrap())
            .is_err());
        assert!(state
            .apply(SessionCommand::parse("symbol AAPL").unwrap())
            .is_err());

        state
            .apply(SessionCommand::parse("symbol spy").unwrap())
            .unwrap();
        state
            .apply(SessionCommand::parse("amount 25000").unwrap())
            .unwrap();
        assert_eq!(state.projection.symbol, "SPY");
        assert_eq!(state.projection.amount, 25_000);
    }

    #[test]
    fn test_inputs_of_the_other_mode_are_rejected() {
        let mut state = SessionState::new(DashboardKind::Crypto, today());
        assert!(state
            .apply(SessionCommand::parse("years 3").unwrap())
            .is_err());

        state
            .apply(SessionCommand::parse("dashboard currency").unwrap())
            .unwrap();
        assert_eq!(state.kind, DashboardKind::Currency);
        assert_eq!(state.projection.symbol, "INR");
        assert!(state
            .apply(SessionCommand::parse("threshold 5").unwrap())
            .is_err());
    }

    #[test]
    fn test_help_lists_mode_commands() {
        let portfolio = SessionState::new(DashboardKind::Stocks, today()).help();
        assert!(portfolio.contains("alloc"));
        assert!(!portfolio.contains("years"));

        let projection = SessionState::new(DashboardKind::Currency, today()).help();
        assert!(projection.contains("INR, EUR"));
        assert!(projection.contains("1000 to 100000"));
    }

    #[test]
    fn test_completions_cover_choices() {
        let tmp = tempfile::tempdir().unwrap();
        let rl = Readline::new(completions(), Some(tmp.path().join("history"))).unwrap();

        assert_eq!(
            rl.completions_with_start("symbol VTS"),
            vec![(7, "VTSAX ".to_string())]
        );
        assert_eq!(
            rl.completions_with_start("dashboard cr"),
            vec![(10, "crypto ".to_string())]
        );
        assert_eq!(rl.completions_with_start("thr"), vec![(0, "threshold ".to_string())]);
    }
}
