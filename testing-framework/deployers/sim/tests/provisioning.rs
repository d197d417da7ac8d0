use std::time::Duration;

use ln_testing_framework_core::{
    nodes::{Amount, ShortChannelId},
    provision::{ConfigurationError, InvariantViolation, ProvisionError, TopologyReplicator},
    scenario::{Deployer as _, ScenarioConfig, ScenarioDriver},
    topology::{ChannelOpenPolicy, ChannelPolicyUpdate, Edge, TopologyDescriptor},
};
use ln_testing_framework_runner_sim::{SimDeployer, SimDeployerError, SimParams};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

type TestResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 75 sats per block, spendable after two confirmations: five base blocks
/// leave exactly 300 sats for the funding round.
fn params() -> SimParams {
    SimParams {
        block_reward: Amount::from_sat(75),
        coinbase_maturity: 2,
        endpoint_ready_after: Duration::from_secs(12),
        gossip_delay: Duration::from_secs(8),
        ..SimParams::default()
    }
}

fn config() -> ScenarioConfig {
    ScenarioConfig {
        base_blocks: 5,
        coinbase_maturity: 2,
        split_granularity_sats: Amount::from_sat(1),
        ..ScenarioConfig::default()
    }
}

fn open(sats: u64) -> ChannelOpenPolicy {
    ChannelOpenPolicy::new(Amount::from_sat(sats))
}

fn fee_update() -> ChannelPolicyUpdate {
    ChannelPolicyUpdate {
        base_fee_msat: 1_000,
        fee_rate_ppm: 200,
        time_lock_delta: 40,
        min_htlc_msat: None,
        max_htlc_msat: None,
    }
}

#[tokio::test(start_paused = true)]
async fn two_payment_nodes_get_one_channel_and_one_policy_update() -> TestResult {
    init_tracing();
    let descriptor = TopologyDescriptor::with_nodes(&[false, true, true])
        .with_edge(Edge::peer(0, 1))
        .with_edge(Edge::peer(2, 1))
        .with_edge(Edge::channel(1, 2, open(50)).with_target_policy(fee_update()));
    let deployer = SimDeployer::new(params());
    let network = deployer.network();

    let deployment = deployer.deploy(&descriptor).await?;
    let report = ScenarioDriver::new(deployment, config()).run().await?;

    assert_eq!(report.split, Amount::from_sat(150));
    assert_eq!(report.peer_connections, 1);
    assert_eq!(report.channel_count(), 1);
    assert_eq!(report.to_string(), "LN ready with 2 nodes and 1 channels.");

    // base 5, funding confirmation 6, channel confirmation 7, then 10 more
    let channel = &report.channels[0];
    assert!(channel.funding_point.to_string().ends_with(":0"));
    assert_eq!(channel.confirmation_height, 7);
    assert_eq!(channel.short_channel_id, ShortChannelId::new(7, 1, 0)?);
    assert_eq!(report.final_height, 17);

    let block = network.block(7)?.ok_or("confirmation block missing")?;
    assert_eq!(block, vec![block[0], channel.funding_point.txid]);

    let journal = network.policy_journal()?;
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].node, 2);
    assert_eq!(journal[0].funding_point, channel.funding_point);
    assert_eq!(journal[0].view_sizes, vec![1, 1]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn policy_updates_wait_for_gossip_to_reach_outsiders() -> TestResult {
    init_tracing();
    let descriptor = TopologyDescriptor::with_nodes(&[false, true, true, true])
        .with_edge(Edge::peer(3, 1))
        .with_edge(Edge::channel(1, 2, open(20)).with_target_policy(fee_update()))
        .with_edge(Edge::channel(3, 2, open(30)))
        .with_edge(Edge::channel(2, 1, open(40)).with_target_policy(fee_update()));
    let deployer = SimDeployer::new(SimParams {
        block_reward: Amount::from_sat(100),
        ..params()
    });
    let network = deployer.network();

    let deployment = deployer.deploy(&descriptor).await?;
    let started = Instant::now();
    let report = ScenarioDriver::new(deployment, config()).run().await?;

    // four mature blocks of 100 split three ways
    assert_eq!(report.split, Amount::from_sat(133));
    let heights: Vec<_> = report
        .channels
        .iter()
        .map(|channel| channel.confirmation_height)
        .collect();
    assert_eq!(heights, vec![7, 8, 9]);
    assert!(report.channels.iter().all(|channel| {
        ShortChannelId::new(channel.confirmation_height, 1, 0).ok()
            == Some(channel.short_channel_id)
    }));
    assert!(started.elapsed() >= Duration::from_secs(8));

    let journal = network.policy_journal()?;
    let targets: Vec<_> = journal.iter().map(|record| record.node).collect();
    assert_eq!(targets, vec![2, 1]);
    assert!(
        journal
            .iter()
            .all(|record| record.view_sizes == vec![3, 3, 3])
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn funding_output_on_index_one_halts_before_confirmation() -> TestResult {
    init_tracing();
    // 150 funded, 120 capacity: the 30 change sorts ahead of the funding output
    let descriptor =
        TopologyDescriptor::with_nodes(&[false, true, true])
            .with_edge(Edge::channel(1, 2, open(120)));
    let deployer = SimDeployer::new(params());
    let network = deployer.network();

    let deployment = deployer.deploy(&descriptor).await?;
    let err = ScenarioDriver::new(deployment, config())
        .run()
        .await
        .expect_err("non-zero funding output must abort");

    assert!(matches!(
        err,
        ProvisionError::Invariant(InvariantViolation::NonZeroOutputIndex { .. })
    ));
    assert_eq!(network.height()?, 6);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn replication_is_idempotent_on_a_peered_graph() -> TestResult {
    init_tracing();
    let descriptor = TopologyDescriptor::with_nodes(&[true, true, true, false])
        .with_edge(Edge::peer(0, 1))
        .with_edge(Edge::peer(1, 2))
        .with_edge(Edge::peer(2, 3));
    let deployer = SimDeployer::new(SimParams::default());
    let network = deployer.network();
    let deployment = deployer.deploy(&descriptor).await?;
    let replicator = TopologyReplicator::new(&deployment.registry);

    let first = replicator.replicate(&deployment.graph).await?;
    let peers_after_first: Vec<_> = (0..3)
        .map(|index| network.peers(index))
        .collect::<Result<_, _>>()?;
    let second = replicator.replicate(&deployment.graph).await?;
    let peers_after_second: Vec<_> = (0..3)
        .map(|index| network.peers(index))
        .collect::<Result<_, _>>()?;

    assert_eq!(first, 2);
    assert_eq!(second, 2);
    assert_eq!(peers_after_first, peers_after_second);
    assert_eq!(peers_after_first[1].len(), 2);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn gossip_barrier_times_out_with_pending_nodes() -> TestResult {
    init_tracing();
    let descriptor = TopologyDescriptor::with_nodes(&[false, true, true, true])
        .with_edge(Edge::channel(1, 2, open(50)));
    let deployer = SimDeployer::new(SimParams {
        gossip_delay: Duration::from_secs(3_600),
        ..params()
    });
    let deployment = deployer.deploy(&descriptor).await?;
    let config = ScenarioConfig {
        gossip_timeout: Duration::from_secs(30),
        ..config()
    };

    let err = ScenarioDriver::new(deployment, config)
        .run()
        .await
        .expect_err("outsider never learns the channel");

    let ProvisionError::Timeout(timeout) = &err else {
        panic!("expected a gossip timeout, got {err}");
    };
    let message = timeout.to_string();
    assert!(message.contains("still pending: node-3"), "{message}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn base_too_small_for_the_split_is_a_configuration_error() -> TestResult {
    init_tracing();
    let descriptor = TopologyDescriptor::with_nodes(&[true, true]);
    let deployer = SimDeployer::new(params());
    let deployment = deployer.deploy(&descriptor).await?;
    let config = ScenarioConfig {
        split_granularity_sats: Amount::from_sat(200),
        ..config()
    };

    let err = ScenarioDriver::new(deployment, config)
        .run()
        .await
        .expect_err("300 sats cannot fund two 200-sat splits");

    assert!(matches!(
        err,
        ProvisionError::Configuration(ConfigurationError::InsufficientFunds { recipients: 2, .. })
    ));
    Ok(())
}

#[tokio::test]
async fn deployer_rejects_empty_and_repeated_deployments() -> TestResult {
    let deployer = SimDeployer::default();

    let err = deployer
        .deploy(&TopologyDescriptor::default())
        .await
        .expect_err("empty topology");
    assert!(matches!(err, SimDeployerError::EmptyTopology));

    let descriptor = TopologyDescriptor::with_nodes(&[true]);
    deployer.deploy(&descriptor).await?;
    let err = deployer
        .deploy(&descriptor)
        .await
        .expect_err("second deployment");
    assert!(matches!(err, SimDeployerError::AlreadyDeployed));
    Ok(())
}
