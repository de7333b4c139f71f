//! Encoding graphs with shared and circular references.
//!
//! Run with: cargo run --example shared_and_cyclic

use lino_objects_codec::{decode, encode, lino, List, Map, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Plain tree
    let user = lino!({"name": "Alice", "roles": ["admin", "dev"]});
    println!("Tree:\n{}\n", encode(&user)?);

    // One settings object referenced from two places
    let settings = lino!({"theme": "dark"});
    let app = Map::new();
    app.insert("main", settings.clone());
    app.insert("popup", settings);
    let text = encode(&Value::from(app))?;
    println!("Shared:\n{}\n", text);

    let back = decode(&text)?;
    if let Some(map) = back.as_map() {
        if let (Some(Value::Map(main)), Some(Value::Map(popup))) =
            (map.get("main"), map.get("popup"))
        {
            main.insert("theme", "light");
            println!(
                "After changing main, popup theme is {:?}\n",
                popup.get("theme")
            );
        }
    }

    // A doubly linked pair
    let first = Map::new();
    let second = Map::new();
    first.insert("value", 1);
    first.insert("next", second.clone());
    second.insert("value", 2);
    second.insert("prev", first.clone());
    println!("Cycle:\n{}\n", encode(&Value::from(first))?);

    // A list that contains itself
    let list = List::new();
    list.push("head");
    list.push(list.clone());
    let text = encode(&Value::from(list))?;
    println!("Self reference:\n{}", text);

    let back = decode(&text)?;
    if let Some(list) = back.as_list() {
        let inner = list.get(1);
        let same = inner
            .as_ref()
            .and_then(Value::as_list)
            .is_some_and(|inner| inner.ptr_eq(list));
        println!("Decoded list contains itself: {}", same);
    }
    // Cycles hold themselves alive; empty them before dropping
    back.release();

    Ok(())
}
