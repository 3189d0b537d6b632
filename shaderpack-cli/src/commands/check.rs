use std::process::ExitCode;

use crate::config::PackagerConfig;
use crate::detect::{detect_all_tools, missing_required};
use crate::state::ToolStatus;

pub async fn run(config: &PackagerConfig) -> ExitCode {
    let tools = detect_all_tools(config).await;

    print_tool("xcrun", &tools.xcrun);
    if config.preprocess {
        print_tool("preprocessor", &tools.cpp);
    }

    let missing = missing_required(&tools, config);
    if missing.is_empty() {
        println!("All tools required for the {} variant are available.", config.variant.label());
        ExitCode::SUCCESS
    } else {
        eprintln!("Missing required tools: {}", missing.join(", "));
        ExitCode::FAILURE
    }
}

fn print_tool(role: &str, status: &ToolStatus) {
    match status {
        ToolStatus::Found { version, path } => {
            println!("  {role:<13} {version} ({})", path.display())
        }
        ToolStatus::NotFound => println!("  {role:<13} not found"),
    }
}
