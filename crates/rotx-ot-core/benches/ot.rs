use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use rand::Rng;
use rand_chacha::ChaCha12Rng;
use rand_core::SeedableRng;
use rotx_core::Block;
use rotx_ot_core::{
    chou_orlandi,
    kos::{self, ReceiverConfig, SenderConfig, CSP},
};

fn bench_chou_orlandi(c: &mut Criterion) {
    let mut group = c.benchmark_group("chou_orlandi");
    for n in [128, 256, 1024] {
        let msgs = vec![[Block::ZERO, Block::ONES]; n];
        let choices = vec![true; n];
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("{n}"), |b| {
            b.iter(|| {
                let (sender_setup, mut sender) = chou_orlandi::Sender::new().setup();
                let mut receiver = chou_orlandi::Receiver::new().setup(sender_setup).unwrap();

                let receiver_payload = receiver.choose(black_box(&choices));
                let sender_payload = sender.send(black_box(&msgs), receiver_payload).unwrap();
                black_box(receiver.receive(sender_payload).unwrap())
            })
        });
    }
}

fn bench_kos(c: &mut Criterion) {
    let mut group = c.benchmark_group("kos");
    for n in [1024, 262_144] {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let choices: Vec<bool> = (0..n).map(|_| rng.gen()).collect();
        let delta: Block = rng.gen();
        let chi_seed: Block = rng.gen();
        let session: Block = rng.gen();
        let receiver_seeds: [[Block; 2]; CSP] = std::array::from_fn(|_| [rng.gen(), rng.gen()]);
        let sender_seeds: [Block; CSP] =
            std::array::from_fn(|i| receiver_seeds[i][delta.bit(i) as usize]);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("{n}"), |b| {
            b.iter(|| {
                let mut sender = kos::Sender::new(SenderConfig::default(), delta)
                    .setup(sender_seeds, session);
                let mut receiver =
                    kos::Receiver::new(ReceiverConfig::default()).setup(receiver_seeds, session);

                let extend = receiver.extend(black_box(&choices), &mut rng).unwrap();
                sender.extend(n, extend).unwrap();

                let (check, receiver_output) = receiver.check(chi_seed).unwrap();
                let sender_output = sender.check(chi_seed, check).unwrap();
                black_box((sender_output, receiver_output))
            })
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_chou_orlandi, bench_kos
}
criterion_main!(benches);
