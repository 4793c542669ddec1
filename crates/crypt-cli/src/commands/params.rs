//! Parameter listing command.

use clap::Args;
use crypt_engine::{ParamId, ParamScale};
use serde_json::{Value, json};

#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Only list parameters in this group (e.g. "Delay")
    #[arg(long)]
    group: Option<String>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

fn selected(group: Option<&str>) -> Vec<ParamId> {
    ParamId::ALL
        .into_iter()
        .filter(|id| group.is_none_or(|g| id.descriptor().group.eq_ignore_ascii_case(g)))
        .collect()
}

fn to_json(id: ParamId) -> Value {
    let desc = id.descriptor();
    let scale = match desc.scale {
        ParamScale::Linear => json!("linear"),
        ParamScale::Power(exp) => json!({ "power": exp }),
    };
    json!({
        "id": desc.string_id,
        "name": desc.name,
        "group": desc.group,
        "unit": desc.unit.suffix().trim(),
        "min": desc.min,
        "max": desc.max,
        "default": desc.default,
        "step": desc.step,
        "scale": scale,
    })
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let ids = selected(args.group.as_deref());
    if ids.is_empty() {
        anyhow::bail!(
            "No parameters in group '{}'",
            args.group.unwrap_or_default()
        );
    }

    if args.json {
        let list: Vec<Value> = ids.into_iter().map(to_json).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!("Parameters");
    println!();
    println!(
        "  {:16}  {:20}  {:10}  {:>12}  {}",
        "Name", "Label", "Group", "Default", "Range"
    );
    println!(
        "  {:16}  {:20}  {:10}  {:>12}  {}",
        "----", "-----", "-----", "-------", "-----"
    );
    for id in ids {
        let desc = id.descriptor();
        let unit = desc.unit.suffix();
        println!(
            "  {:16}  {:20}  {:10}  {:>12}  {} - {}{}",
            desc.string_id,
            desc.name,
            desc.group,
            format!("{}{}", desc.default, unit),
            desc.min,
            desc.max,
            unit
        );
    }
    println!();
    println!("Set with --set NAME=VALUE (names are case-insensitive).");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_filter_is_case_insensitive() {
        let delay = selected(Some("delay"));
        assert_eq!(
            delay,
            [ParamId::DelayTime, ParamId::DelayFeedback, ParamId::DelayMix]
        );
        assert_eq!(selected(None).len(), ParamId::COUNT);
        assert!(selected(Some("nope")).is_empty());
    }

    #[test]
    fn json_entry_carries_range() {
        let value = to_json(ParamId::Master);
        assert_eq!(value["id"], "master");
        assert_eq!(value["min"], -12.0);
        assert_eq!(value["unit"], "dB");
    }
}
