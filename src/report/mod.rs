pub mod json;
pub mod table;

use serde::Serialize;

use crate::error::Result;

/// Prints `value` as JSON, or via `table` otherwise.
pub fn print<T: Serialize + ?Sized>(value: &T, as_json: bool, table: impl FnOnce(&T) -> String) -> Result<()> {
    if as_json {
        println!("{}", json::render(value)?);
    } else {
        print!("{}", table(value));
    }
    Ok(())
}
