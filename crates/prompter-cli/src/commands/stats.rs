use anyhow::Result;

use prompter_core::script::{Script, ScriptStats};

pub fn run(script: &Script, words_per_minute: u32, json: bool) -> Result<()> {
    let stats = script.stats(words_per_minute);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", format_stats(&stats, words_per_minute));
    }

    Ok(())
}

fn format_stats(stats: &ScriptStats, words_per_minute: u32) -> String {
    if stats.words == 0 {
        return "Script is empty.\n".to_string();
    }

    let minutes = if stats.estimated_minutes == 1 {
        "1 minute".to_string()
    } else {
        format!("{} minutes", stats.estimated_minutes)
    };

    format!(
        "Words:      {}\nCharacters: {}\nReading:    ~{} at {} wpm\n",
        stats.words, stats.characters, minutes, words_per_minute
    )
}
