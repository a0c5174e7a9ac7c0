use digitrace_core::{MAX_BASE, MIN_BASE, configure_base};

pub fn run() {
    println!("{:<6} {:<14} Digits", "Base", "Name");
    println!("{}", "-".repeat(60));
    for base in MIN_BASE..=MAX_BASE {
        match configure_base(base) {
            Ok(config) => println!(
                "{:<6} {:<14} {}",
                config.base,
                config.name,
                config.labels.join(" ")
            ),
            Err(e) => eprintln!("  base {base}: {e}"),
        }
    }
}
