//! Performance benchmarks for section-solver-core.
//!
//! Run with: cargo bench -p section-solver-core --bench solver_perf
//!
//! Results are stored in target/criterion/ for historical comparison.
//! Criterion will automatically detect performance regressions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use section_solver_core::constraints::{ConstraintType, SectionAssignmentConstraint, SectionSetConstraint};
use section_solver_core::domain::{Candidate, DomainObject};
use section_solver_core::model::BacktrackingModel;

/// A problem with `num_sections` sections (each capped at `per_section`
/// items) and `num_items` scored candidates.
fn make_problem(num_sections: u32, per_section: i64, num_items: u32) -> (SectionSetConstraint, Vec<Candidate>) {
    let section_uris: Vec<String> = (0..num_sections).map(|i| format!("section:{i}")).collect();
    let sections: Vec<DomainObject> = section_uris.iter().map(|u| DomainObject::new(u.clone())).collect();

    let mut constraint = SectionSetConstraint::new().set_sections(sections).unwrap();
    for uri in &section_uris {
        constraint = constraint.add_section_count_constraint(Some(uri), ConstraintType::Leq, per_section).unwrap();
    }

    let items: Vec<Candidate> = (0..num_items)
        .map(|i| {
            let mut candidate = Candidate::new(DomainObject::new(format!("item:{i}")));
            candidate.applied_explanations.push("bench".to_string());
            candidate.applied_scores.push((i + 1) as f64);
            candidate
        })
        .collect();

    (constraint, items)
}

fn bench_problem_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("problem_sizes");

    let small = make_problem(2, 2, 8);
    let medium = make_problem(3, 3, 12);
    let large = make_problem(3, 4, 16);

    group.throughput(Throughput::Elements(8));
    group.bench_with_input(BenchmarkId::new("small", "2s/2cap/8i"), &small, |b, (constraint, items)| {
        b.iter(|| {
            let mut model = BacktrackingModel::new();
            section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
        })
    });

    group.throughput(Throughput::Elements(12));
    group.bench_with_input(BenchmarkId::new("medium", "3s/3cap/12i"), &medium, |b, (constraint, items)| {
        b.iter(|| {
            let mut model = BacktrackingModel::new();
            section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
        })
    });

    group.throughput(Throughput::Elements(16));
    group.bench_with_input(BenchmarkId::new("large", "3s/4cap/16i"), &large, |b, (constraint, items)| {
        b.iter(|| {
            let mut model = BacktrackingModel::new();
            section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
        })
    });

    group.finish();
}

/// Benchmark with the extra constraint kinds layered on top of the base
/// count caps, each in isolation.
fn bench_with_constraints(c: &mut Criterion) {
    let mut group = c.benchmark_group("constrained");

    let (base, items) = make_problem(3, 3, 12);

    let with_assignment = base
        .clone()
        .add_section_assignment_constraint(SectionAssignmentConstraint {
            constraint_type: ConstraintType::Am1,
            section_a: "section:0".to_string(),
            section_b: "section:1".to_string(),
        })
        .unwrap();

    let with_filter = base
        .clone()
        .set_section_assignment_filter("section:0", |obj| {
            obj.uri
                .strip_prefix("item:")
                .and_then(|n| n.parse::<u32>().ok())
                .is_some_and(|n| n % 2 == 0)
        })
        .unwrap();

    group.throughput(Throughput::Elements(12));

    group.bench_with_input(BenchmarkId::new("count_caps_only", "3s/3cap/12i"), &(base, items.clone()), |b, (constraint, items)| {
        b.iter(|| {
            let mut model = BacktrackingModel::new();
            section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
        })
    });

    group.bench_with_input(
        BenchmarkId::new("section_assignment", "am1"),
        &(with_assignment, items.clone()),
        |b, (constraint, items)| {
            b.iter(|| {
                let mut model = BacktrackingModel::new();
                section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
            })
        },
    );

    group.bench_with_input(
        BenchmarkId::new("assignment_filter", "even_only"),
        &(with_filter, items),
        |b, (constraint, items)| {
            b.iter(|| {
                let mut model = BacktrackingModel::new();
                section_solver_core::solve(black_box(constraint), items.clone(), &mut model)
            })
        },
    );

    group.finish();
}

criterion_group!(benches, bench_problem_sizes, bench_with_constraints);
criterion_main!(benches);
