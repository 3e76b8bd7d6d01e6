use anyhow::Result;
use serde::Serialize;
use serde_json::json;
use std::io::{self, Write};

pub fn print_plan<T: Serialize>(op: &str, plan: &T) -> Result<()> {
    let env = json!({ "op": op, "apply": false, "plan": plan });
    let mut out = io::stdout();
    serde_json::to_writer(&mut out, &env)?;
    writeln!(&mut out)?;
    Ok(())
}

pub fn print_result<T: Serialize>(op: &str, result: &T) -> Result<()> {
    let env = json!({ "op": op, "apply": true, "result": result });
    let mut out = io::stdout();
    serde_json::to_writer(&mut out, &env)?;
    writeln!(&mut out)?;
    Ok(())
}
