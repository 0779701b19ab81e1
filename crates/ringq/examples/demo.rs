use ringq::{
    AsyncMessageQueue, BackpressureStrategy, CompletePolicy, QueueConfig, QueueError, StreamExt,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ringq demo");
    println!("==========\n");

    basic().await?;
    backpressure()?;
    timeout().await?;
    abort().await?;

    Ok(())
}

async fn basic() -> Result<(), Box<dyn std::error::Error>> {
    println!("1. Producers and a single consumer");

    let config = QueueConfig::new(16)
        .with_metrics(true)
        .with_completion(CompletePolicy::Drain);
    let queue = AsyncMessageQueue::<String>::new(config)?;

    let mut handles = vec![];
    for id in 0..3 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            for seq in 0..4 {
                queue.enqueue(format!("producer {id} message {seq}"));
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }));
    }

    let closer = {
        let queue = queue.clone();
        tokio::spawn(async move {
            for handle in handles {
                handle.await?;
            }
            queue.complete();
            Ok::<_, tokio::task::JoinError>(())
        })
    };

    let mut stream = queue.stream();
    while let Some(message) = stream.next().await {
        println!("  received: {}", message?);
    }
    closer.await??;

    let metrics = queue.metrics();
    println!("  enqueued:   {}", metrics.enqueued);
    println!("  handed off: {}", metrics.handed_off);
    println!("  dequeued:   {}", metrics.dequeued);
    println!("  avg wait:   {:?}\n", metrics.avg_latency);
    Ok(())
}

fn backpressure() -> Result<(), Box<dyn std::error::Error>> {
    println!("2. Backpressure strategies (capacity 3, messages 1..=6)");

    for strategy in [
        BackpressureStrategy::DropOldest,
        BackpressureStrategy::DropNewest,
        BackpressureStrategy::Block,
        BackpressureStrategy::ThrowError,
    ] {
        let config = QueueConfig::new(3)
            .with_backpressure(strategy)
            .with_metrics(true);
        let queue = AsyncMessageQueue::<u32>::builder(config)
            .on_error(|err| println!("    hook: {err}"))
            .build()?;

        let accepted = (1..=6).filter(|&i| queue.enqueue(i)).count();
        let metrics = queue.metrics();
        println!(
            "  {strategy:?}: accepted {accepted}, buffered {:?}, dropped {}, rotated out {}, errors {}",
            queue.buffered(),
            metrics.dropped,
            metrics.rotated_out,
            metrics.errors
        );
    }
    println!();
    Ok(())
}

async fn timeout() -> Result<(), Box<dyn std::error::Error>> {
    println!("3. Consumer timeout");

    let config = QueueConfig::new(4).with_timeout(Duration::from_millis(50));
    let queue = AsyncMessageQueue::<u32>::new(config)?;

    match queue.recv().await {
        Err(QueueError::Timeout(t)) => println!("  no message within {t:?}"),
        other => println!("  unexpected: {other:?}"),
    }

    queue.enqueue(7);
    println!("  after timeout: {:?}", queue.recv().await?);
    println!("  status: {}\n", queue.status());
    Ok(())
}

async fn abort() -> Result<(), Box<dyn std::error::Error>> {
    println!("4. Abort with error");

    let queue = AsyncMessageQueue::<u32>::with_capacity(4)?;
    let consumer = {
        let queue = queue.clone();
        tokio::spawn(async move { queue.recv().await })
    };

    tokio::time::sleep(Duration::from_millis(10)).await;
    queue.abort_with_error("upstream closed");

    match consumer.await? {
        Err(err) => println!("  consumer saw: {err}"),
        Ok(message) => println!("  consumer saw: {message:?}"),
    }
    println!("  enqueue after abort accepted: {}", queue.enqueue(1));
    println!("  status: {}", queue.status());
    Ok(())
}
