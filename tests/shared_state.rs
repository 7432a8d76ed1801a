//! Concurrent access through the shared server state

use std::sync::Arc;

use shardpir_client::{ClientSession, LookupResult};
use shardpir_core::PirConfig;
use shardpir_server::{create_shared_state, ServerState};

/// Many writers hitting one previously absent shard must not lose updates
#[tokio::test]
async fn test_concurrent_inserts_same_shard() {
    let state = create_shared_state(ServerState::from_config(PirConfig::presence(20)).unwrap());

    let mut handles = Vec::new();
    for slot in 0..20u64 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move {
            state.write().await.insert(9846819000 + slot).unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let guard = state.read().await;
    assert_eq!(guard.store().count(), 1);

    let shard = guard.store().materialize(492340950);
    assert!(shard.cells()[..20].iter().all(|b| *b == 1));
    assert_eq!(shard.reserved(), 0);
}

/// Readers run against the read lock while a writer is queued
#[tokio::test]
async fn test_concurrent_queries() {
    let config = PirConfig::presence(20);
    let mut server = ServerState::from_config(config.clone()).unwrap();
    server.insert(9846819001).unwrap();
    let state = create_shared_state(server);
    let client = Arc::new(ClientSession::from_config(&config).unwrap());

    let mut handles = Vec::new();
    for key in [9846819001u64, 9846819002, 8846819001, 9846819001] {
        let state = Arc::clone(&state);
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            let query = client.build_query_bytes(key).unwrap();
            let response = state.read().await.process_query_bytes(&query).unwrap();
            (key, client.decode_response_bytes(&response).unwrap())
        }));
    }

    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            state.write().await.insert(1).unwrap();
        })
        .await
        .unwrap();
    }

    for handle in handles {
        let (key, result) = handle.await.unwrap();
        assert_eq!(result, LookupResult::Presence(key == 9846819001), "key {}", key);
    }

    assert!(state.read().await.store().contains_shard(0));
}
