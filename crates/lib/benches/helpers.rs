use patchlog::{
    Snapshot,
    snapshot::{Scalar, flatten},
    tree::{Record, Tree},
};

/// Builds a customer record with `orders` nested order records and a tag map.
///
/// Each order carries a list of line items so the tree exercises records,
/// lists and maps at several depths.
pub fn customer(orders: usize) -> Tree {
    let orders = (0..orders)
        .map(|i| {
            let items = (0..3)
                .map(|j| {
                    Record::new("LineItem")
                        .with("sku", format!("sku-{i}-{j}"))
                        .with("quantity", (j + 1) as i64)
                        .with("price", 9.99 * (j + 1) as f64)
                        .into()
                })
                .collect::<Vec<Tree>>();
            Record::new("Order")
                .with("id", i as i64)
                .with("shipped", i % 2 == 0)
                .with("items", Tree::List(items))
                .into()
        })
        .collect::<Vec<Tree>>();

    let tags = (0..orders.len().min(16))
        .map(|i| (Tree::from(format!("tag_{i}")), Tree::Scalar(Scalar::UInt(i as u64))))
        .collect();

    Record::new("Customer")
        .with("name", "Bob Smith")
        .with("orders", Tree::List(orders))
        .with("tags", Tree::Map(tags))
        .into()
}

/// Same customer with the name changed and one order appended.
pub fn edited_customer(orders: usize) -> Tree {
    let mut tree = customer(orders + 1);
    if let Tree::Record(record) = &mut tree {
        record.insert("name", "Robert Smith");
    }
    tree
}

pub fn snapshot(tree: &Tree) -> Snapshot {
    flatten(tree).expect("Failed to flatten benchmark tree")
}
