use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fedconf_codec::{decode, encode, EncodeOptions};
use fedconf_value::{DynamicValue, TypeDescriptor};

fn entry_descriptor() -> TypeDescriptor {
    let source = TypeDescriptor::object([
        ("type", TypeDescriptor::string()),
        ("id", TypeDescriptor::string()),
    ]);
    TypeDescriptor::object([("source", source), ("value", TypeDescriptor::string())])
}

fn sample_fulfillment(entries: usize) -> DynamicValue {
    let descriptor = entry_descriptor();
    let source_descriptor = descriptor.attribute("source").cloned().expect("declared source");
    let entries = (0..entries).map(|index| {
        let source = DynamicValue::object(
            source_descriptor.clone(),
            [
                ("type", DynamicValue::string("LDAP_DATA_STORE")),
                ("id", DynamicValue::string("ldapDs")),
            ],
        )
        .expect("sample source must build");
        let entry = DynamicValue::object(
            descriptor.clone(),
            [("source", source), ("value", DynamicValue::string(format!("attr{index}")))],
        )
        .expect("sample entry must build");
        (format!("claim_{index}"), entry)
    });
    DynamicValue::map(descriptor.clone(), entries).expect("sample map must build")
}

fn bench_encode_fulfillment(c: &mut Criterion) {
    let value = sample_fulfillment(64);
    c.bench_function("fedconf_codec/encode_fulfillment_64", |b| {
        b.iter(|| {
            let doc =
                encode(black_box(&value), EncodeOptions::legacy()).expect("encode should succeed");
            black_box(doc);
        });
    });
}

fn bench_decode_fulfillment(c: &mut Criterion) {
    let value = sample_fulfillment(64);
    let doc = encode(&value, EncodeOptions::legacy())
        .expect("encode should succeed")
        .expect("known map is present");
    c.bench_function("fedconf_codec/decode_fulfillment_64", |b| {
        b.iter(|| {
            let decoded =
                decode(black_box(&doc), value.descriptor()).expect("decode should succeed");
            black_box(decoded);
        });
    });
}

criterion_group!(codec_paths, bench_encode_fulfillment, bench_decode_fulfillment);
criterion_main!(codec_paths);
