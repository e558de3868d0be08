use codspeed_criterion_compat::{
    BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use elastiquery::{BoolOp, Client, ProtocolVersion, Query, QueryOptions};

// Request body construction for wide and deep query trees

fn wide_query(client: &Client, clauses: usize) -> Query {
    let terms: Vec<Query> = (0..clauses)
        .map(|i| client.term_query(format!("field{i}"), format!("value{i}")))
        .collect();
    client.and_query(&terms).unwrap()
}

fn deep_query(client: &Client, depth: usize) -> Query {
    let mut query = client.prefix_query("path", "/api");
    for i in 0..depth {
        let op = if i % 2 == 0 { BoolOp::And } else { BoolOp::Or };
        let range = client.range_query("bytes", Some(i.to_string().into()), None);
        query = client.bool_query(op, &[query, range]).unwrap();
    }
    query
}

fn benchmark_wide_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_query_body");
    let options = QueryOptions::default();

    for protocol in [ProtocolVersion::V2, ProtocolVersion::V6] {
        let client = Client::new(protocol, "http://localhost:9200").unwrap();
        for clauses in [1, 10, 100] {
            let query = wide_query(&client, clauses);
            group.bench_with_input(
                BenchmarkId::new(protocol.to_string(), clauses),
                &query,
                |b, query| b.iter(|| black_box(query.request_body(&options).unwrap())),
            );
        }
    }
    group.finish();
}

fn benchmark_deep_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_query_body");
    let options = QueryOptions::default().with_limit(50).with_reverse_sort();

    for protocol in [ProtocolVersion::V2, ProtocolVersion::V6] {
        let client = Client::new(protocol, "http://localhost:9200").unwrap();
        for depth in [4, 32] {
            let query = deep_query(&client, depth);
            group.bench_with_input(
                BenchmarkId::new(protocol.to_string(), depth),
                &query,
                |b, query| b.iter(|| black_box(query.request_body(&options).unwrap())),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_wide_queries, benchmark_deep_queries);
criterion_main!(benches);
