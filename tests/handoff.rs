use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rendezvous::{channel, demo, task, DemoConfig, EndOfStream, State, TaskError};

#[test]
fn test_received_100() {
    let (tx, rx) = channel();

    let producer = task::spawn("producer", move || tx.send(100)).unwrap();
    let value = rx.recv().unwrap();

    assert_eq!(format!("Received: {value}"), "Received: 100");
    assert!(producer.join().unwrap().is_ok());
}

#[test]
fn test_producer_blocks_until_consumer_arrives() {
    let (tx, rx) = channel();
    let events = Arc::new(Mutex::new(Vec::new()));

    let log = events.clone();
    let producer = task::spawn("producer", move || {
        let started = Instant::now();
        tx.send(100).unwrap();
        log.lock().unwrap().push("sent");
        started
    })
    .unwrap();

    while rx.state() != State::ValuePending {
        thread::yield_now();
    }
    thread::sleep(Duration::from_millis(50));
    assert!(events.lock().unwrap().is_empty());

    assert_eq!(rx.recv(), Ok(100));
    let received_at = Instant::now();
    events.lock().unwrap().push("received");

    let send_started = producer.join().unwrap();
    assert!(received_at >= send_started);
    assert_eq!(events.lock().unwrap().len(), 2);
}

#[test]
fn test_closed_before_send() {
    let (tx, rx) = channel::<i32>();
    tx.close();

    let started = Instant::now();
    assert_eq!(rx.recv(), Err(EndOfStream));
    assert!(started.elapsed() < Duration::from_secs(1));

    let mut buf = Vec::new();
    demo::closed(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "Received: end of stream\n");
}

#[test]
fn test_handoff_demo_output() {
    let mut buf = Vec::new();

    demo::handoff(&DemoConfig::default(), &mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "Received: 100\n");
}

#[test]
fn test_values_arrive_in_order() {
    let (tx, rx) = channel();

    let producer = task::spawn("producer", move || {
        for word in ["one", "two", "three"] {
            tx.send(word.to_string()).unwrap();
        }
    })
    .unwrap();

    assert_eq!(rx.iter().collect::<Vec<_>>(), ["one", "two", "three"]);
    producer.join().unwrap();
    assert_eq!(rx.state(), State::Closed);
}

#[test]
fn test_panicking_producer_closes_channel() {
    let (tx, rx) = channel::<u8>();

    let producer = task::spawn("faulty", move || {
        let _tx = tx;
        panic!("producer failed");
    })
    .unwrap();

    assert_eq!(rx.recv(), Err(EndOfStream));
    assert!(matches!(producer.join(), Err(TaskError::Panicked { .. })));
}

#[test]
fn test_config_from_file() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/demo.toml");
    std::env::set_var(rendezvous::config::CONFIG_PATH_ENV, path);

    let config = DemoConfig::from_env().unwrap();

    assert_eq!(config.value, 42);
    assert_eq!(config.count, 3);
    assert_eq!(config.log_level, "info");
}
