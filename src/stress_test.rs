use async_stream::stream;
use futures::stream::{Stream, StreamExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tangle_ledgerstate::{BranchID, ConflictID, ConflictRegistry, OutputID, TransactionID};
use tangle_message::{KeyPair, Message, MessageBuilder, MessageID, Payload, EMPTY_MESSAGE_ID};
use tangle_storage::{KVStore, MemoryKVStore, ObjectStorage, StorageConfig};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Statistics collected during stress testing
#[derive(Clone, Debug)]
pub struct StressTestStats {
    pub name: &'static str,
    pub num_workers: usize,
    pub operations_per_worker: usize,
    pub total_checks: usize,
    pub failed_checks: usize,
    pub total_time: Duration,
    pub avg_check_time: Duration,
    pub ops_per_second: f64,
}

impl StressTestStats {
    pub fn print(&self) {
        println!("\n╔════════════════════════════════════════════════════════════╗");
        println!("║  {:<58}║", self.name);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║  Number of Workers:         {:>30} ║", self.num_workers);
        println!("║  Operations per Worker:     {:>30} ║", self.operations_per_worker);
        println!("║  Total Checks:              {:>30} ║", self.total_checks);
        println!("║  Failed Checks:             {:>30} ║", self.failed_checks);
        println!("║  Total Time:                {:>29}s ║", format!("{:.3}", self.total_time.as_secs_f64()));
        println!("║  Average Check Time:        {:>28}µs ║", self.avg_check_time.as_micros());
        println!("║  Operations/Second:         {:>30.0} ║", self.ops_per_second);
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

fn average(times: &[Duration]) -> Duration {
    if times.is_empty() {
        Duration::ZERO
    } else {
        times.iter().sum::<Duration>() / times.len() as u32
    }
}

/// Yields random indices into a pool of `len` items.
fn random_index_generator(len: usize, count: usize) -> impl Stream<Item = usize> {
    stream! {
        let mut rng = StdRng::from_entropy();
        for _ in 0..count {
            yield rng.gen_range(0..len);
        }
    }
}

/// Pick up to `count` distinct tips from the pool.
fn select_tips(tips: &[MessageID], count: usize, rng: &mut StdRng) -> Vec<MessageID> {
    if tips.is_empty() {
        return vec![EMPTY_MESSAGE_ID];
    }
    (0..count).map(|_| tips[rng.gen_range(0..tips.len())]).collect()
}

/// Issuers build and sign messages on top of a shared tip pool; afterwards
/// random messages are loaded back from storage, decoded and verified.
pub async fn stress_test_messages(
    num_issuers: usize,
    messages_per_issuer: usize,
    num_checks: usize,
) -> Result<StressTestStats, BoxError> {
    info!(num_issuers, messages_per_issuer, num_checks, "message stress test started");
    let start = Instant::now();

    let backend: Arc<dyn KVStore> = Arc::new(MemoryKVStore::new());
    let config = StorageConfig::new("message/").with_key_partition(vec![MessageID::LENGTH]);
    let storage = Arc::new(ObjectStorage::<Message>::new(Arc::clone(&backend), config));
    let tips: Arc<Mutex<Vec<MessageID>>> = Arc::new(Mutex::new(Vec::new()));

    println!("\n[Phase 1/2] Issuing signed messages...");

    let mut handles = vec![];
    for issuer in 0..num_issuers {
        let storage = Arc::clone(&storage);
        let tips = Arc::clone(&tips);
        handles.push(tokio::spawn(async move {
            let key_pair = KeyPair::generate();
            let mut rng = StdRng::from_entropy();
            let mut issued = Vec::with_capacity(messages_per_issuer);

            for sequence_number in 0..messages_per_issuer {
                let strong = {
                    let tips = tips.lock().await;
                    let start = tips.len().saturating_sub(64);
                    select_tips(&tips[start..], rng.gen_range(1..=4), &mut rng)
                };
                let mut builder = MessageBuilder::new()
                    .with_sequence_number(sequence_number as u64)
                    .with_payload(Payload::generic_data(format!("issuer {issuer} message {sequence_number}")));
                for parent in strong {
                    builder = builder.with_strong_parent(parent);
                }

                let message = builder.build_signed(&key_pair)?;
                let id = message.id();
                storage.store(message)?;
                tips.lock().await.push(id);
                issued.push(id);

                if sequence_number % 100 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            Ok::<_, BoxError>(issued)
        }));
    }

    let mut issued = Vec::with_capacity(num_issuers * messages_per_issuer);
    for handle in handles {
        issued.extend(handle.await??);
    }
    let flushed = storage.flush()?;
    debug!(written = flushed.written, "persisted issued messages");

    println!("[Phase 1/2] ✓ Completed");
    println!("[Phase 2/2] Decoding and verifying stored messages...");

    // A fresh storage forces every load through the decoder.
    let config = StorageConfig::new("message/").with_key_partition(vec![MessageID::LENGTH]);
    let reader = ObjectStorage::<Message>::new(backend, config);

    let mut check_times = vec![];
    let mut failed_checks = 0;
    let mut indices = Box::pin(random_index_generator(issued.len().max(1), num_checks));
    while let Some(index) = indices.next().await {
        let Some(id) = issued.get(index) else { break };
        let check_start = Instant::now();
        let verified = match reader.load(id.as_bytes())? {
            Some(message) => message.id() == *id && message.verify_signature(),
            None => false,
        };
        check_times.push(check_start.elapsed());
        if !verified {
            warn!(message = %id, "stored message failed verification");
            failed_checks += 1;
        }
    }

    println!("[Phase 2/2] ✓ Completed");

    let total_time = start.elapsed();
    let total_operations = issued.len() + check_times.len();
    Ok(StressTestStats {
        name: "Message Issue/Verify Stress Test",
        num_workers: num_issuers,
        operations_per_worker: messages_per_issuer,
        total_checks: check_times.len(),
        failed_checks,
        total_time,
        avg_check_time: average(&check_times),
        ops_per_second: total_operations as f64 / total_time.as_secs_f64(),
    })
}

/// Workers register overlapping branches as members of shared conflicts and
/// prune some of them again; afterwards every conflict's member count must
/// equal the number of member edges found by prefix scan.
pub async fn stress_test_conflicts(
    num_workers: usize,
    num_conflicts: usize,
    operations_per_worker: usize,
) -> Result<StressTestStats, BoxError> {
    info!(num_workers, num_conflicts, operations_per_worker, "conflict stress test started");
    let start = Instant::now();

    let registry = Arc::new(ConflictRegistry::new(Arc::new(MemoryKVStore::new())));
    let conflicts: Arc<Vec<ConflictID>> = Arc::new(
        (0..num_conflicts)
            .map(|_| ConflictID::from_output_id(OutputID::from_transaction(TransactionID::random(), 0)))
            .collect(),
    );
    let branches: Arc<Vec<BranchID>> = Arc::new(
        (0..num_workers.max(1) * 4)
            .map(|_| BranchID::from_transaction_id(TransactionID::random()))
            .collect(),
    );

    println!("\n[Phase 1/2] Registering and pruning conflict members...");

    let mut handles = vec![];
    for _ in 0..num_workers {
        let registry = Arc::clone(&registry);
        let conflicts = Arc::clone(&conflicts);
        let branches = Arc::clone(&branches);
        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            for i in 0..operations_per_worker {
                let conflict = conflicts[rng.gen_range(0..conflicts.len())];
                let branch = branches[rng.gen_range(0..branches.len())];
                if rng.gen_bool(0.25) {
                    registry.unregister_member(conflict, branch)?;
                } else {
                    registry.register_member(conflict, branch)?;
                }

                if i % 100 == 0 {
                    tokio::task::yield_now().await;
                }
            }
            Ok::<_, BoxError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    let flushed = registry.flush()?;
    debug!(written = flushed.written, deleted = flushed.deleted, "persisted conflicts");

    println!("[Phase 1/2] ✓ Completed");
    println!("[Phase 2/2] Checking member counts...");

    let mut check_times = vec![];
    let mut failed_checks = 0;
    for conflict in conflicts.iter() {
        let check_start = Instant::now();
        let member_count = registry.member_count(conflict)?;
        let members = registry.members(conflict)?.len() as u64;
        check_times.push(check_start.elapsed());
        if member_count != members {
            warn!(conflict = %conflict, member_count, members, "member count diverged");
            failed_checks += 1;
        }
    }

    println!("[Phase 2/2] ✓ Completed");

    let total_time = start.elapsed();
    let total_operations = num_workers * operations_per_worker + check_times.len();
    Ok(StressTestStats {
        name: "Conflict Registry Stress Test",
        num_workers,
        operations_per_worker,
        total_checks: check_times.len(),
        failed_checks,
        total_time,
        avg_check_time: average(&check_times),
        ops_per_second: total_operations as f64 / total_time.as_secs_f64(),
    })
}

/// Message throughput for a growing number of concurrent issuers.
pub async fn stress_test_scaling(max_issuers: usize, step_size: usize) -> Result<(), BoxError> {
    let mut current_issuers = step_size;
    while current_issuers <= max_issuers {
        let stats = stress_test_messages(current_issuers, 50, current_issuers * 50).await?;
        stats.print();
        current_issuers += step_size;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_verify_after_reload() {
        let stats = stress_test_messages(3, 20, 40).await.unwrap();
        assert_eq!(stats.total_checks, 40);
        assert_eq!(stats.failed_checks, 0);
    }

    #[tokio::test]
    async fn test_conflict_counts_match_members() {
        let stats = stress_test_conflicts(4, 3, 200).await.unwrap();
        assert_eq!(stats.total_checks, 3);
        assert_eq!(stats.failed_checks, 0);
    }

    #[test]
    fn test_select_tips_falls_back_to_genesis() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(select_tips(&[], 3, &mut rng), vec![EMPTY_MESSAGE_ID]);

        let tips = [MessageID::random()];
        assert_eq!(select_tips(&tips, 2, &mut rng), vec![tips[0], tips[0]]);
    }
}
