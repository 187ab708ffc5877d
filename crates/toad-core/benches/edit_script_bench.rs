use criterion::{Criterion, black_box, criterion_group, criterion_main};
use toad_core::lemma::{EditScript, LemmaInstanceWriter, ParticleTable};
use toad_core::lexicon::LemmaIndex;

fn bench_edit_scripts(c: &mut Criterion) {
    let particles = ParticleTable::dutch();

    let pairs = vec![
        ("gelopen", "lopen", "WW(vd,vrij,zonder)"),
        ("opgebeld", "opbellen", "WW(vd,vrij,zonder)"),
        ("liep", "lopen", "WW(pv,verl,ev)"),
        ("huizen", "huis", "N(soort,mv,basis)"),
        ("arbeidsongeschiktheidsverzekeringen", "arbeidsongeschiktheidsverzekering", "N(soort,mv,basis)"),
    ];

    c.bench_function("edit_script_single", |b| {
        b.iter(|| EditScript::compute(black_box("gelopen"), black_box("lopen"), "WW(vd,vrij,zonder)", &particles));
    });

    c.bench_function("edit_script_batch_5", |b| {
        b.iter(|| {
            for (word, lemma, tag) in &pairs {
                let _ = EditScript::compute(black_box(word), black_box(lemma), tag, &particles).label(tag);
            }
        });
    });

    let mut index = LemmaIndex::new();
    for i in 0..1000 {
        for (word, lemma, tag) in &pairs {
            index.insert(&format!("{word}{i}"), lemma, tag);
        }
    }
    c.bench_function("instance_file_5000", |b| {
        b.iter(|| {
            let mut writer = LemmaInstanceWriter::new(std::io::sink());
            writer.push_index(black_box(&index), &particles).unwrap();
            writer.finish().unwrap()
        });
    });
}

criterion_group!(benches, bench_edit_scripts);
criterion_main!(benches);
