use std::{hint::black_box, sync::Arc};

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use rowbind::{
    BindingConfiguration, ColumnSet, Field, Header, Mapper, Record, Value, ValueRow, compile,
    resolve,
};

#[derive(Debug, Default)]
struct Order {
    order_id: i64,
    customer: String,
    quantity: i32,
    unit_price: f64,
    note: Option<String>,
}

impl Record for Order {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::new("OrderId", |o: &mut Order, v| o.order_id = v),
            Field::new("Customer", |o: &mut Order, v| o.customer = v),
            Field::new("Quantity", |o: &mut Order, v| o.quantity = v),
            Field::new("UnitPrice", |o: &mut Order, v| o.unit_price = v),
            Field::new("Note", |o: &mut Order, v| o.note = v),
        ]
    }
}

fn generate_rows(count: usize) -> Vec<ValueRow> {
    let header = Arc::new(Header::new([
        "ORDER_ID",
        "CUSTOMER",
        "QUANTITY",
        "UNIT_PRICE",
        "NOTE",
    ]));
    (0..count)
        .map(|i| {
            let note = if i % 4 == 0 {
                Value::Null
            } else {
                Value::from(format!("note {i}"))
            };
            ValueRow::new(
                Arc::clone(&header),
                vec![
                    Value::Int(i as i64),
                    Value::from(format!("customer-{}", i % 97)),
                    Value::Int((i % 12) as i64 + 1),
                    Value::Float(9.5 + (i % 5) as f64),
                    note,
                ],
            )
        })
        .collect()
}

fn bench_materialize(c: &mut Criterion) {
    let rows = generate_rows(10_000);
    let config = BindingConfiguration::new().with_stripping_convention(true);
    let mapper = Mapper::new();

    let mut group = c.benchmark_group("materialize");

    group.bench_function("cached_mapper", |b| {
        b.iter(|| {
            for row in &rows {
                let order: Order = mapper.materialize(row, &config).expect("materialize");
                black_box(order.order_id + i64::from(order.quantity));
            }
        });
    });

    group.bench_function("resolve_and_compile_per_row", |b| {
        b.iter_batched(
            || (),
            |_| {
                for row in rows.iter().take(1_000) {
                    let fields = Order::fields();
                    let mapping = resolve(
                        &ColumnSet::from_row(row),
                        fields.iter().map(Field::info),
                        &config,
                    );
                    let materializer = compile::<Order>(&mapping).expect("compile");
                    let order = materializer.materialize(row).expect("materialize");
                    black_box((order.unit_price, order.customer, order.note));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_materialize);
criterion_main!(benches);
