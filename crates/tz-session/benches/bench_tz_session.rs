use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tz_session::{issue_token, verify_token, SessionStore};

fn bench_csrf(c: &mut Criterion) {
    let token = issue_token("bench-secret");
    c.bench_function("csrf_issue", |b| b.iter(|| black_box(issue_token(black_box("bench-secret")))));
    c.bench_function("csrf_verify", |b| {
        b.iter(|| black_box(verify_token(black_box("bench-secret"), black_box(&token)).is_ok()))
    });
}

fn bench_store(c: &mut Criterion) {
    let store = SessionStore::new(3600);
    let ids: Vec<String> = (0..1000).map(|_| store.create().id).collect();
    c.bench_function("session_lookup_1000", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(store.get(id));
            }
        })
    });
}

criterion_group!(benches, bench_csrf, bench_store);
criterion_main!(benches);
