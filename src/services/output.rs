use crate::domain::models::{ComplyError, JsonOut};
use serde::Serialize;

pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        for d in data {
            println!("{}", row(d));
        }
    }
    Ok(())
}

/// Fatal errors share one machine contract: `{"ok":false,"error":{code,message}}`.
pub fn print_error(json: bool, err: &anyhow::Error) {
    let code = err
        .downcast_ref::<ComplyError>()
        .map(|e| e.code())
        .unwrap_or("INTERNAL");
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": false,
                "error": { "code": code, "message": format!("{:#}", err) }
            })
        );
    } else {
        eprintln!("error: {:#}", err);
    }
}
