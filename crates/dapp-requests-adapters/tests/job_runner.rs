mod common;

use serde_json::json;

use dapp_requests_adapters::SigningAdapterConfig;
use dapp_requests_core::{
    JobReceipt, JsonRpcBody, PortError, SubmissionRoute, TransactionRepositoryPort,
};

use common::{
    batched_calls_request, new_runtime, new_runtime_with, owner_address, personal_sign_request,
    ready_conditions, send_transaction_request, TOPIC,
};

#[test]
fn confirmed_transaction_is_submitted_and_answered() {
    let rt = new_runtime();
    let mut handle = rt
        .dispatcher
        .open(send_transaction_request("201"))
        .expect("eligible request");
    rt.dispatcher
        .confirm(&mut handle, &ready_conditions())
        .expect("confirm");

    let results = rt.drain_jobs().expect("drain");
    assert_eq!(results.len(), 1);
    let tx_hash = match results.into_iter().next() {
        Some(Ok(JobReceipt::Submitted { tx_hash })) => tx_hash,
        other => panic!("unexpected job result: {other:?}"),
    };
    assert!(rt.adapters.jobs.is_empty().expect("queue len"));

    let broadcasts = rt.adapters.network.broadcasts().expect("broadcasts");
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0].chain_id, 1);
    assert_eq!(broadcasts[0].route, SubmissionRoute::Public);

    assert_eq!(
        rt.adapters
            .repository
            .transactions_for(owner_address())
            .expect("transactions"),
        vec![tx_hash]
    );
    let stored = rt
        .adapters
        .repository
        .transaction(owner_address(), tx_hash)
        .expect("lookup")
        .expect("stored tx");
    assert_eq!(stored.nonce, Some(0));
    assert!(stored.gas_limit.is_some());

    let responses = rt.adapters.walletconnect.responses().expect("responses");
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].topic, TOPIC);
    assert_eq!(responses[0].response.id, 201);
    assert_eq!(responses[0].response.body, JsonRpcBody::Result(json!(tx_hash)));

    let submissions = rt.adapters.analytics.submissions().expect("submissions");
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].tx_hash, tx_hash);
}

#[test]
fn private_submission_follows_config() {
    let rt = new_runtime_with(SigningAdapterConfig {
        submit_via_private_rpc: true,
        ..SigningAdapterConfig::default()
    });
    let mut handle = rt
        .dispatcher
        .open(send_transaction_request("202"))
        .expect("eligible request");
    rt.dispatcher
        .confirm(&mut handle, &ready_conditions())
        .expect("confirm");
    rt.drain_jobs().expect("drain");

    let broadcasts = rt.adapters.network.broadcasts().expect("broadcasts");
    assert_eq!(broadcasts.len(), 1);
    assert_eq!(broadcasts[0].route, SubmissionRoute::Private);
}

#[test]
fn batched_calls_run_through_delegation_signer() {
    let rt = new_runtime();
    let mut handle = rt
        .dispatcher
        .open(batched_calls_request("203"))
        .expect("eligible request");
    rt.dispatcher
        .confirm(&mut handle, &ready_conditions())
        .expect("confirm");
    rt.drain_jobs().expect("drain");

    let submissions = rt.adapters.analytics.submissions().expect("submissions");
    assert_eq!(submissions.len(), 1);
    assert!(submissions[0].includes_delegation);
}

#[test]
fn confirmed_message_is_signed_and_answered() {
    let rt = new_runtime();
    let mut handle = rt
        .dispatcher
        .open(personal_sign_request("204"))
        .expect("eligible request");
    rt.dispatcher
        .confirm(&mut handle, &ready_conditions())
        .expect("confirm");

    let results = rt.drain_jobs().expect("drain");
    let signature = match results.into_iter().next() {
        Some(Ok(JobReceipt::Signed { signature })) => signature,
        other => panic!("unexpected job result: {other:?}"),
    };
    assert_eq!(signature.len(), 65);
    assert!(rt.adapters.network.broadcasts().expect("broadcasts").is_empty());

    let responses = rt.adapters.walletconnect.responses().expect("responses");
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].response.id, 204);
    assert_eq!(responses[0].response.body, JsonRpcBody::Result(json!(signature)));
}

#[test]
fn failed_job_does_not_block_the_queue() {
    let rt = new_runtime();
    let conditions = ready_conditions();
    let mut tx = rt
        .dispatcher
        .open(send_transaction_request("205"))
        .expect("eligible request");
    rt.dispatcher.confirm(&mut tx, &conditions).expect("confirm");
    let mut msg = rt
        .dispatcher
        .open(personal_sign_request("206"))
        .expect("eligible request");
    rt.dispatcher.confirm(&mut msg, &conditions).expect("confirm");

    // Account removed between confirmation and execution.
    rt.adapters
        .accounts
        .remove(owner_address())
        .expect("remove account");

    let results = rt.drain_jobs().expect("drain");
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0], Err(PortError::NotFound(_))));
    assert!(matches!(results[1], Ok(JobReceipt::Signed { .. })));
    assert!(rt.adapters.network.broadcasts().expect("broadcasts").is_empty());

    let responses = rt.adapters.walletconnect.responses().expect("responses");
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].response.id, 206);
}
