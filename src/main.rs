use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::env;

use alex_core::logging::init_logger;
use alex_core::{
    articulate_digits, expand_state_abbrev, price_bundle, sanitize_speech, validate_bank,
    validate_card, BankInput, BundleItem, CardInput,
};

const USAGE: &str = "\
Usage: alex <command> [args]

Commands:
  card <number> <cvv> <month> <year> [brand]
  bank <routing> <account> [check]
  price <price[xmonths]>...        e.g. price 100 29.99x12
  state <code>
  digits <text>
  sanitize <text...>";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let args: Vec<String> = args
        .into_iter()
        .filter(|a| a != "-v" && a != "--verbose")
        .collect();

    init_logger(verbose);

    let Some((command, rest)) = args.split_first() else {
        eprintln!("{}", USAGE);
        std::process::exit(1);
    };

    let ok = match command.as_str() {
        "card" => run_card(rest)?,
        "bank" => run_bank(rest)?,
        "price" => run_price(rest)?,
        "state" => print_text(expand_state_abbrev(required(rest, 0, "code")?))?,
        "digits" => print_text(articulate_digits(required(rest, 0, "text")?))?,
        "sanitize" => print_text(sanitize_speech(&rest.join(" ")))?,
        "help" | "-h" | "--help" => {
            println!("{}", USAGE);
            true
        }
        other => {
            eprintln!("❌ Unknown command: {}\n\n{}", other, USAGE);
            std::process::exit(1);
        }
    };

    if !ok {
        std::process::exit(2);
    }

    Ok(())
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument <{}>\n\n{}", name, USAGE))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_text(text: String) -> Result<bool> {
    print_json(&serde_json::json!({ "text": text }))?;
    Ok(true)
}

fn run_card(args: &[String]) -> Result<bool> {
    let input = CardInput {
        number: Some(required(args, 0, "number")?.to_string()),
        cvv: Some(required(args, 1, "cvv")?.to_string()),
        exp_month: Some(parse_int(required(args, 2, "month")?, "month")?),
        exp_year: Some(parse_int(required(args, 3, "year")?, "year")?),
        brand: args.get(4).cloned(),
    };

    let result = validate_card(&input);
    print_json(&result)?;
    Ok(result.ok)
}

fn run_bank(args: &[String]) -> Result<bool> {
    let input = BankInput {
        routing_number: Some(required(args, 0, "routing")?.to_string()),
        account_number: Some(required(args, 1, "account")?.to_string()),
        check_number: args.get(2).cloned(),
    };

    let result = validate_bank(&input);
    print_json(&result)?;
    Ok(result.ok)
}

fn run_price(args: &[String]) -> Result<bool> {
    let items = args
        .iter()
        .map(|arg| parse_item(arg))
        .collect::<Result<Vec<_>>>()?;

    print_json(&price_bundle(&items))?;
    Ok(true)
}

/// "29.99x12" → price 29.99 for 12 months
fn parse_item(arg: &str) -> Result<BundleItem> {
    let (price, months) = match arg.split_once(['x', 'X']) {
        Some((price, months)) => (price, Some(parse_int(months, "months")?)),
        None => (arg, None),
    };

    let price: f64 = price
        .trim()
        .trim_start_matches('$')
        .parse()
        .with_context(|| format!("Invalid price: {:?}", arg))?;
    if !price.is_finite() {
        bail!("Invalid price: {:?}", arg);
    }

    Ok(BundleItem {
        name: None,
        price,
        months,
    })
}

fn parse_int(raw: &str, name: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid {}: {:?}", name, raw))
}
