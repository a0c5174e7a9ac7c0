use digitrace_core::{GeneratorCategory, all_generator_infos};

const CATEGORIES: [GeneratorCategory; 6] = [
    GeneratorCategory::Classic,
    GeneratorCategory::Modern,
    GeneratorCategory::Mathematical,
    GeneratorCategory::QuasiRandom,
    GeneratorCategory::TrueRandom,
    GeneratorCategory::Data,
];

pub fn run(verbose: bool) {
    let infos = all_generator_infos();
    println!("{} digit generators (bases 2-16):", infos.len());

    for category in CATEGORIES {
        let members: Vec<_> = infos.iter().filter(|i| i.category == category).collect();
        if members.is_empty() {
            continue;
        }
        println!("\n{category}:\n");
        for info in members {
            let flag = if info.warning { "\u{26A0}\u{FE0F} " } else { "   " };
            println!(
                "  {flag}{:<14} {:<22} {}",
                info.key, info.name, info.description
            );
            if verbose {
                println!("      kind: {}, distribution: {}", info.kind, info.distribution);
                println!("      {}", info.mechanism);
            }
        }
    }

    println!("\nUse --algorithm <key> with `digitrace run`. Unknown keys fall back to lcg.");
}
