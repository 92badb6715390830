pub mod pdf;

/// 縦横を整数で割る（最小1px）
pub fn reduced_dimensions((width, height): (u32, u32), factor: u32) -> (u32, u32) {
    let factor = factor.max(1);
    ((width / factor).max(1), (height / factor).max(1))
}
