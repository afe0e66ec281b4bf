use ext_merge_sort::codec::Codec;

#[allow(dead_code)]
pub fn int_codec() -> Codec<i64> {
    Codec::new(
        |e: &i64| e.to_le_bytes().to_vec(),
        |bytes: &[u8]| {
            let arr: [u8; 8] = bytes
                .try_into()
                .map_err(|_| anyhow::anyhow!("expected 8 bytes, got {}", bytes.len()))?;
            Ok(i64::from_le_bytes(arr))
        },
    )
}
