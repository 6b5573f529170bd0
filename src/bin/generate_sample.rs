use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Whether an event with probability `p` happens.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

struct Order {
    region: &'static str,
    channel: &'static str,
    product: &'static str,
    units: i64,
    revenue: f64,
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // (name, relative market size)
    let regions = [("North", 1.0), ("South", 0.7), ("East", 1.3), ("West", 0.5)];
    let channels = [("Online", 1.2), ("Retail", 1.0), ("Partner", 0.4)];
    // (name, unit price)
    let products = [("Widget", 12.5), ("Gadget", 40.0), ("Gizmo", 7.25), ("Doohickey", 99.0)];

    let mut orders = Vec::new();
    for &(region, size) in &regions {
        for &(channel, reach) in &channels {
            for &(product, price) in &products {
                // Not every product is sold everywhere, so some flows are absent.
                if !rng.chance(0.8) {
                    continue;
                }
                for _ in 0..3 {
                    let units = (rng.next_f64() * 50.0 * size * reach).round() as i64 + 1;
                    let revenue = (units as f64 * price * 100.0).round() / 100.0;
                    orders.push(Order {
                        region,
                        channel,
                        product,
                        units,
                        revenue,
                    });
                }
            }
        }
    }

    // Write CSV
    let csv_path = "sample_sales.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    writer
        .write_record(["region", "channel", "product", "units", "revenue"])
        .expect("Failed to write CSV header");
    for o in &orders {
        writer
            .write_record([
                o.region.to_string(),
                o.channel.to_string(),
                o.product.to_string(),
                o.units.to_string(),
                format!("{:.2}", o.revenue),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Build Arrow arrays
    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("channel", DataType::Utf8, false),
        Field::new("product", DataType::Utf8, false),
        Field::new("units", DataType::Int64, false),
        Field::new("revenue", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(orders.iter().map(|o| o.region).collect::<Vec<_>>())),
            Arc::new(StringArray::from(orders.iter().map(|o| o.channel).collect::<Vec<_>>())),
            Arc::new(StringArray::from(orders.iter().map(|o| o.product).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(orders.iter().map(|o| o.units).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(orders.iter().map(|o| o.revenue).collect::<Vec<_>>())),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_sales.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} orders to {csv_path} and {parquet_path}",
        orders.len()
    );
}
