use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use rolegate::security::{
    Action, Enforcer, Permission, PolicyEnforcer, ResourceType, RoleBasedPolicy, RoleStore, TaggedResource,
};

fn gen_permissions(n: usize) -> Vec<Permission> {
    (0..n)
        .map(|i| {
            let ty = if i % 2 == 0 { ResourceType::A } else { ResourceType::B };
            Permission::builder(format!("p{i}"))
                .resource_type(ty)
                .action(if i % 3 == 0 { Action::Edit } else { Action::Read })
                .policy(RoleBasedPolicy::new([format!("role-{i}")]))
                .build()
        })
        .collect()
}

fn gen_requests(n: usize, seed: u64) -> Vec<(TaggedResource, Vec<Action>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let ty = if rng.gen::<bool>() { ResourceType::A } else { ResourceType::B };
            let actions = match rng.gen_range(0..3) {
                0 => vec![Action::Read],
                1 => vec![Action::Edit],
                _ => vec![Action::Read, Action::Edit],
            };
            (TaggedResource::new(format!("r{i}"), ty), actions)
        })
        .collect()
}

fn bench_enforce(c: &mut Criterion) {
    let mut roles = RoleStore::new();
    roles.add_roles("user", (0..64).map(|i| format!("role-{i}")));
    let requests = gen_requests(1_000, 0xBEEF_CAFE);

    let mut group = c.benchmark_group("enforce");
    group.throughput(Throughput::Elements(requests.len() as u64));
    for n in [3usize, 16, 64] {
        let permissions = gen_permissions(n);
        group.bench_with_input(BenchmarkId::new("first_match", n), &permissions, |b, perms| {
            b.iter(|| {
                let mut granted = 0usize;
                for (res, actions) in &requests {
                    if PolicyEnforcer.enforce(&roles, perms, "user", res, actions).allow {
                        granted += 1;
                    }
                }
                criterion::black_box(granted);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_enforce);
criterion_main!(benches);
