//! # Pagewright CLI
//!
//! Usage:
//!   pagewright report.json -o report.pdf
//!   cat report.json | pagewright -o report.pdf
//!   pagewright report.json --layout > layout.json
//!   pagewright --example > asset-report.json

use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use pagewright::error::LayoutError;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return ExitCode::SUCCESS;
    }

    let input = if args.len() > 1 && !args[1].starts_with('-') {
        match fs::read_to_string(&args[1]) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("✗ Failed to read {}: {}", args[1], e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("✗ Failed to read stdin: {e}");
            return ExitCode::FAILURE;
        }
        buf
    };

    if args.iter().any(|a| a == "--layout") {
        let json = pagewright::layout_json(&input)
            .and_then(|pages| serde_json::to_string_pretty(&pages).map_err(LayoutError::from));
        return match json {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&e),
        };
    }

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    match pagewright::render_json(&input) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                eprintln!("✗ Failed to write {output_path}: {e}");
                return ExitCode::FAILURE;
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
            ExitCode::SUCCESS
        }
        Err(e) => report_error(&e),
    }
}

fn report_error(e: &LayoutError) -> ExitCode {
    eprintln!("✗ {e}");
    if let LayoutError::Parse { hint, .. } = e {
        if !hint.is_empty() {
            eprintln!("  hint: {hint}");
        }
    }
    ExitCode::FAILURE
}

fn example_report_json() -> &'static str {
    r##"{
  "metadata": {
    "title": "IT Asset Inventory",
    "author": "IT Operations",
    "subject": "Quarterly asset and maintenance report"
  },
  "page": {
    "size": "A4",
    "margin": { "top": 54, "right": 54, "bottom": 54, "left": 54 }
  },
  "watermark": { "text": "INTERNAL", "fontSize": 72 },
  "footer": { "template": "IT Asset Inventory  ·  Page {{pageNumber}} of {{totalPages}}" },
  "blocks": [
    {
      "type": "text",
      "content": "IT Asset Inventory",
      "style": { "fontSize": 22, "weight": "Bold", "align": "Center", "spaceAfter": 4 }
    },
    {
      "type": "text",
      "content": "Generated for the IT department. Figures reflect the state of the asset register at the end of the quarter.",
      "style": { "fontSize": 9, "align": "Center", "color": { "r": 0.4, "g": 0.4, "b": 0.4 }, "spaceAfter": 12 }
    },
    { "type": "line", "style": { "thickness": 1.5, "color": { "r": 0.18, "g": 0.31, "b": 0.44 } } },
    { "type": "heading", "content": "Summary" },
    {
      "type": "textBox",
      "content": "412 assets in service\n37 open tickets\n9 assets in maintenance",
      "width": 240,
      "style": { "lineSpacing": 1.5, "spaceAfter": 10 }
    },
    { "type": "heading", "content": "Laptops" },
    {
      "type": "table",
      "header": ["Asset Tag", "Model", "Assigned To", "Status"],
      "columnRatios": [1, 2, 2, 1],
      "rows": [
        ["LT-0001", "ThinkPad X1 Carbon Gen 11", "Accounts Payable", "In use"],
        ["LT-0002", "ThinkPad X1 Carbon Gen 11", "Service Desk", "In use"],
        ["LT-0003", "Latitude 7440", "Facilities", "Repair"],
        ["LT-0004", "MacBook Pro 14", "Design", "In use"],
        ["LT-0005", "Latitude 7440", "Spare pool", "Stock"],
        ["LT-0006", "EliteBook 840 G10", "Legal", "In use"],
        ["LT-0007", "EliteBook 840 G10", "Human Resources", "In use"],
        ["LT-0008", "MacBook Air 13", "Marketing", "Retired"]
      ],
      "style": { "columnAlign": ["Left", "Left", "Left", "Center"] }
    },
    { "type": "heading", "content": "Open Maintenance Tickets" },
    {
      "type": "table",
      "header": ["Ticket", "Asset", "Description"],
      "columnRatios": [1, 1, 4],
      "rows": [
        ["MT-311", "LT-0003", "Keyboard unresponsive after liquid spill; replacement part ordered from vendor."],
        ["MT-318", "SRV-014", "Redundant power supply reports intermittent failure."],
        ["MT-322", "PR-0102", "Paper jam sensor fault on tray 2."]
      ],
      "style": { "border": "Dashed" }
    },
    { "type": "heading", "content": "Asset Label" },
    {
      "type": "barcode",
      "data": "LT-0001",
      "style": { "size": 72, "caption": true, "errorCorrection": "Quartile" }
    }
  ]
}
"##
}
