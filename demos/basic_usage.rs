#!/usr/bin/env rust

//! Basic usage example of typeview: declare types, map views, assign records

use typeview::{
    define_struct, FieldValue, Region, Result, StructOptions, Update, Value, View, FLOAT64, INT32,
    UINT8,
};

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("typeview Example");
    println!("================");

    // Declare a point and a rectangle made of two points
    let point = define_struct(
        [("x", INT32), ("y", INT32)],
        StructOptions::transparent().with_name("Point"),
    )?;
    let rect = define_struct(
        [("ul", point.clone()), ("lr", point.clone())],
        StructOptions::transparent().with_name("Rect"),
    )?;
    println!("Point: size {}, align {}", point.size(), point.align());
    println!("Rect:  size {}, align {}", rect.size(), rect.align());

    // A mixed record shows alignment padding
    let sample = define_struct(
        [("flag", UINT8), ("weight", FLOAT64), ("id", INT32)],
        StructOptions::transparent().with_name("Sample"),
    )?;
    let sample_type = sample.as_struct().map(|st| st.as_ref());
    if let Some(st) = sample_type {
        for field in st.fields() {
            println!("  Sample.{:<6} @ {}", field.name(), field.offset());
        }
        println!("  size {}", st.size());
    }

    // Map views onto a heap region
    let region = Region::heap(128)?;
    let ints = region.windows().int32();
    ints.set(8, 37);
    ints.set(9, 42);

    let pt = point.view(&region, 32)?;
    println!("\nPoint view at 32: {:?}", pt);

    pt.set("x", 13)?;
    pt.assign(&Update::new().set("y", 88))?;
    println!("After writes: int32[8] = {:?}, int32[9] = {:?}", ints.get(8), ints.get(9));

    // Nested views alias the same bytes
    let r = rect.view(&region, 32)?;
    let lr = r.field("lr")?;
    lr.set("x", 15)?;
    println!("rect.lr at byte {} -> int32[10] = {:?}", lr.byte_offset(), ints.get(10));

    // Sparse structural assignment touches only the named fields
    r.assign(
        &Update::new()
            .record("ul", Update::new().set("x", 1))
            .record("lr", Update::new().set("y", 2)),
    )?;
    print_view(&r, "rect");

    // Integer fields wrap, float fields round
    let s = sample.view(&region, 64)?;
    s.set("flag", 300)?;
    s.set("weight", 2.5)?;
    s.set("id", -1.9)?;
    assert_eq!(s.get("flag")?, Value::Uint8(44));
    print_view(&s, "sample");

    println!("\nExample completed successfully!");
    Ok(())
}

fn print_view(view: &View<'_>, prefix: &str) {
    for (name, value) in view.entries() {
        match value {
            FieldValue::Scalar(v) => println!("  {}.{} = {}", prefix, name, v),
            FieldValue::Struct(child) => print_view(&child, &format!("{}.{}", prefix, name)),
        }
    }
}
