use stress_test::{stress_test_conflicts, stress_test_messages, stress_test_scaling, BoxError};
use tracing_subscriber::EnvFilter;
pub mod stress_test;

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async_main())
}

async fn async_main() -> Result<(), BoxError> {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            TANGLE STRESS TESTS                             ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: messages, small scale
    stress_test_messages(4, 100, 200).await?.print();

    // Test 2: conflicts, small scale
    stress_test_conflicts(4, 16, 500).await?.print();

    // Test 3: messages, medium scale
    stress_test_messages(10, 500, 1000).await?.print();

    // Test 4: conflicts, heavy contention
    stress_test_conflicts(16, 4, 2000).await?.print();

    // Test 5: Scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS (Messages)                       ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(16, 4).await?;

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}
