/// Every unordered pair of `items`, in input order: `(0,1), (0,2), (1,2), ...`
pub fn pairs<T>(items: &[T]) -> Vec<(&T, &T)> {
    items
        .iter()
        .enumerate()
        .flat_map(|(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
        .collect()
}
