use partition_replay::{
    absorb, BufferProxy, PartitionKey, PartitionedBufferBase, PriorityBuffer, PushedItemMessage,
};
use crossbeam_channel::unbounded;
use std::thread;

#[test_log::test]
fn workers_feed_one_owner() {
    let (sender, receiver) = unbounded::<PushedItemMessage<u32, (u32, f64)>>();
    let handles = (0..4u32)
        .map(|id| {
            let sender = sender.clone();
            thread::spawn(move || {
                let mut proxy = BufferProxy::new(PartitionKey::Id(id), 4, sender);
                for i in 0..10 {
                    proxy.push((id, 1.0 + i as f64)).unwrap();
                }
                proxy.flush().unwrap();
            })
        })
        .collect::<Vec<_>>();
    drop(sender);
    for h in handles {
        h.join().unwrap();
    }

    let mut buf = PriorityBuffer::<u32, u32>::new(5).unwrap();
    assert_eq!(absorb(&mut buf, &receiver).unwrap(), 40);
    assert_eq!(buf.num_partitions(), 4);
    for id in 0..4u32 {
        let key = PartitionKey::Id(id);
        assert_eq!(buf.count(Some(&key)), 5);
        assert!(buf.get_batches(Some(&key)).iter().all(|&&b| b == id));
    }

    let sampled = buf.sample().unwrap();
    assert_eq!(sampled.key, PartitionKey::Id(*sampled.batch));
}
