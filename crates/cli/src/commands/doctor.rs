//! `gemrelay doctor`: Check configuration and credentials.

use gemrelay_config::AppConfig;

pub async fn run() -> gemrelay_core::Result<()> {
    println!("🩺 GemRelay Doctor — Configuration Check");
    println!("========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found at {}", config_path.display());
    } else {
        println!("  ℹ️  No config file at {} — using defaults", config_path.display());
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            println!("     Model:            {}", config.model);
            println!("     Endpoint:         {}", config.base_url);
            println!("     Request timeout:  {}s", config.request_timeout_secs);
            println!("     History window:   {} exchanges", config.limits.max_history_turns);
            println!("     Reply chunk size: {} chars", config.limits.max_response_length);
            println!(
                "     Instruction max:  {} chars",
                config.limits.system_instruction_max_length
            );

            if config.has_api_key() {
                println!("  ✅ API key configured");
            } else {
                println!("  ❌ No API key — set GEMINI_API_KEY or add api_key to config.toml");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
        if !config_path.exists() {
            println!("\n  A config file with the defaults looks like this:\n");
            println!("{}", AppConfig::default_toml());
        }
    }

    Ok(())
}
