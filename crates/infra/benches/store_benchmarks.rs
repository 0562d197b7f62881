use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use warden_auth::{CredentialHash, NewPermission, NewRole, NewUser};
use warden_infra::pagination::{PageLimits, PageRequest};
use warden_infra::{InMemoryEntityStore, Repositories};

fn seeded(users: usize, roles: usize) -> Repositories<InMemoryEntityStore> {
    let repos = Repositories::new(Arc::new(InMemoryEntityStore::new()), PageLimits::default());

    let perm = repos
        .permissions
        .create(NewPermission::new("users.read"))
        .unwrap();
    let role_ids: Vec<_> = (0..roles)
        .map(|i| {
            let role = repos.roles.create(NewRole::new(format!("role-{i}"))).unwrap();
            repos.role_permissions.assign(&role.id, &perm.name).unwrap();
            role.id
        })
        .collect();

    for i in 0..users {
        let user = repos
            .users
            .create(NewUser::new(format!("user-{i:05}")), CredentialHash::new("$bench"))
            .unwrap();
        repos
            .user_roles
            .assign(&user.id, &role_ids[i % role_ids.len()])
            .unwrap();
    }
    repos
}

fn bench_assignment(c: &mut Criterion) {
    let mut group = c.benchmark_group("assignment");
    group.throughput(Throughput::Elements(1));

    group.bench_function("assign_existing_role", |b| {
        let repos = seeded(100, 10);
        let user = repos.users.find_by_username("user-00000").unwrap().unwrap();
        let role = repos.roles.find_by_name("role-0").unwrap().unwrap();
        b.iter(|| black_box(repos.user_roles.assign(&user.id, &role.id).unwrap()));
    });

    group.bench_function("assign_then_remove", |b| {
        let repos = seeded(100, 10);
        let user = repos.users.find_by_username("user-00000").unwrap().unwrap();
        let role = repos.roles.find_by_name("role-1").unwrap().unwrap();
        b.iter(|| {
            repos.user_roles.assign(&user.id, &role.id).unwrap();
            black_box(repos.user_roles.remove(&user.id, &role.id).unwrap())
        });
    });

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_users_first_page");

    for size in [100usize, 1_000, 10_000].iter() {
        let repos = seeded(*size, 10);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(repos.users.list(&PageRequest::first(50)).unwrap()));
        });
    }

    group.finish();
}

fn bench_grants(c: &mut Criterion) {
    let repos = seeded(1_000, 50);
    let user = repos.users.find_by_username("user-00042").unwrap().unwrap();

    c.bench_function("user_grants", |b| {
        b.iter(|| black_box(repos.user_roles.grants(&user.id).unwrap()));
    });
}

criterion_group!(benches, bench_assignment, bench_listing, bench_grants);
criterion_main!(benches);
