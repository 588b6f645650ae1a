use clap::Subcommand;
use repcoach_core::Settings;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "trainer", "repIntervalSec" or "rep_interval_secs")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (e.g. "2", "3s", "yes")
        value: String,
    },
    /// List all config values
    List {
        /// Print as JSON instead of key = value lines
        #[arg(long)]
        json: bool,
    },
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let settings = Settings::load()?;
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            settings.set(&key, &value)?;
            settings.save()?;
            println!("ok");
        }
        ConfigAction::List { json } => {
            let settings = Settings::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                for (key, value) in settings.to_entries() {
                    println!("{key} = {value}");
                }
            }
        }
        ConfigAction::Reset => {
            Settings::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
