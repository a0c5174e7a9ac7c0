pub fn run(host: &str, port: u16, config_path: Option<&str>) {
    let defaults = super::load_config(config_path);
    if let Err(e) = defaults.validate() {
        super::fail(e);
    }

    let base = format!("http://{host}:{port}");

    println!("\u{1F3C1} digitrace server v{}", digitrace_core::VERSION);
    println!("   {base}");
    println!(
        "   defaults: {} digits of {} in base {}",
        defaults.digits, defaults.algorithm, defaults.base
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /                 API index (try: curl {base})");
    println!("     GET /algorithms       Generator metadata");
    println!("     GET /bases/{{base}}     Labels and colors for a base");
    println!("     GET /api/v1/run       Run one session, returns the snapshot");
    println!("     GET /api/v1/last      Snapshot of the most recent run");
    println!("     GET /api/v1/random    Generator output in the ANU QRNG format");
    println!("     GET /health           Health check");
    println!();
    println!("   Query params for /api/v1/run:");
    println!("     algorithm=<key> base=2..16 digits=N sample_every=N seed=<int|phrase>");
    println!("     guess=<label> bet=final_count|lead_time|ghost_score");
    println!();
    println!("   Examples:");
    println!("     curl '{base}/api/v1/run?algorithm=randu&base=16&digits=2000&guess=A'");
    println!("     curl '{base}/api/v1/random?length=32&type=uint8&algorithm=pcg'");
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => super::fail(format!("cannot start runtime: {e}")),
    };
    if let Err(e) = rt.block_on(digitrace_server::run_server(defaults, host, port)) {
        super::fail(format!("server stopped: {e}"));
    }
}
