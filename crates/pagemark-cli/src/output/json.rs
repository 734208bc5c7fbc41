use pagemark_core::error::PagemarkError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), PagemarkError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
