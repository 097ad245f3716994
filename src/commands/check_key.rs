//! Check-key command handler.

use uniqflow::models::Record;
use uniqflow::{Error, KeyExpression, Result};

/// Check-key command.
///
/// Prints the referenced attributes and the key the expression yields for a
/// record built from `name=value` pairs.
pub fn cmd_check_key(key: &str, attributes: &[String]) -> Result<()> {
    let expression = KeyExpression::parse(key)?;

    let mut record = Record::new();
    for pair in attributes {
        let (name, value) = pair.split_once('=').ok_or_else(|| {
            Error::InvalidInput(format!("Attribute '{pair}' must look like name=value"))
        })?;
        record = record.with_attribute(name.trim(), value);
    }

    println!("Expression: {expression}");
    println!("References: {}", expression.references().join(", "));
    match expression.evaluate(&record) {
        Some(value) => println!("Key: {value}"),
        None => println!("Key: (none - record would be routed to failure)"),
    }
    Ok(())
}
