use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// Excel serial of 2024-01-01.
const FIRST_DAY_SERIAL: f64 = 45292.0;

const FB_CATEGORIES: &[&str] = &[
    "公告", "活動", "產品介紹", "節慶", "抽獎", "幕後花絮", "客戶分享", "直播預告",
    "徵才", "新聞", "問答", "其他分類",
];

const IG_CATEGORIES: &[&str] = &[
    "旅遊日記系列一", "旅遊日記系列二", "美食探店", "穿搭分享", "日常", "開箱", "合作",
];

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

    /// Integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> f64 {
        (lo as f64 + (self.next_f64() * (hi - lo + 1) as f64).floor()).min(hi as f64)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

enum Cell {
    Text(String),
    Number(f64),
    Date(f64),
}

fn write_sheet(
    workbook: &mut Workbook,
    name: &str,
    headers: &[&str],
    rows: &[Vec<Cell>],
    date_format: &Format,
) -> Result<()> {
    let sheet: &mut Worksheet = workbook.add_worksheet();
    sheet.set_name(name)?;
    for (col, title) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (r, row) in rows.iter().enumerate() {
        let r = r as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(s) => sheet.write_string(r, col, s)?,
                Cell::Number(n) => sheet.write_number(r, col, *n)?,
                Cell::Date(serial) => sheet.write_number_with_format(r, col, *serial, date_format)?,
            };
        }
    }
    Ok(())
}

fn time_of_day(hour: f64, minute: f64) -> Cell {
    Cell::Text(format!("{:02}:{:02}", hour as u32, minute as u32))
}

// ---------------------------------------------------------------------------
// Facebook
// ---------------------------------------------------------------------------

fn facebook(rng: &mut SimpleRng, date_format: &Format, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let posts: Vec<Vec<Cell>> = (0..120)
        .map(|i| {
            let reach = rng.range(200, 8000);
            vec![
                Cell::Date(FIRST_DAY_SERIAL + (i / 2) as f64),
                time_of_day(rng.range(8, 22), rng.range(0, 59)),
                Cell::Text(rng.pick(FB_CATEGORIES).to_string()),
                Cell::Number(reach),
                Cell::Number((reach * 0.08).floor() + rng.range(0, 40)),
                Cell::Number(rng.range(0, 60)),
                Cell::Number(rng.range(10, 400)),
                Cell::Number(rng.range(0, 80)),
                Cell::Number(rng.range(0, 30)),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "貼文",
        &["發布日期", "發布時間", "類別", "觸及人數", "總點擊次數", "連結點擊次數", "心情", "留言", "分享"],
        &posts,
        date_format,
    )?;

    let videos: Vec<Vec<Cell>> = (0..40)
        .map(|i| {
            let mood = rng.range(5, 550);
            vec![
                Cell::Date(FIRST_DAY_SERIAL + (i * 3) as f64),
                time_of_day(rng.range(8, 22), rng.range(0, 59)),
                Cell::Text(format!("影片 {}", i + 1)),
                Cell::Number(mood),
                Cell::Number(rng.range(500, 39000)),
                Cell::Number(rng.range(1000, 50000)),
                Cell::Number((mood * 0.3).floor() + rng.range(0, 50)),
                Cell::Number((mood * 0.2).floor() + rng.range(0, 40)),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "影片",
        &["發布日期", "發布時間", "標題", "心情", "影片觀看 3 秒以上的次數", "觸及人數", "留言", "分享"],
        &videos,
        date_format,
    )?;

    let stories: Vec<Vec<Cell>> = (0..60)
        .map(|i| {
            vec![
                Cell::Date(FIRST_DAY_SERIAL + i as f64),
                time_of_day(rng.range(7, 23), rng.range(0, 59)),
                Cell::Number(rng.range(100, 3000)),
                Cell::Number(rng.range(0, 200)),
                Cell::Number(rng.range(0, 40)),
                Cell::Number(rng.range(0, 25)),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "限動",
        &["發布日期", "發布時間", "觸及人數", "讚數", "回覆數", "分享數"],
        &stories,
        date_format,
    )?;

    workbook.save(path).with_context(|| format!("saving {}", path.display()))
}

// ---------------------------------------------------------------------------
// Instagram (raw export headers; the dashboard renames them on load)
// ---------------------------------------------------------------------------

fn instagram(rng: &mut SimpleRng, date_format: &Format, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let posts: Vec<Vec<Cell>> = (0..90)
        .map(|i| {
            let hour = rng.range(6, 23);
            let reach = rng.range(300, 12000);
            let shares = rng.range(0, 150);
            vec![
                Cell::Date(FIRST_DAY_SERIAL + i as f64),
                time_of_day(hour, rng.range(0, 59)),
                Cell::Number(hour),
                Cell::Text(rng.pick(IG_CATEGORIES).to_string()),
                Cell::Text(format!("https://www.instagram.com/p/sample{i:03}/")),
                Cell::Number(reach),
                Cell::Number((reach * 0.06).floor() + rng.range(0, 80)),
                Cell::Number(shares),
                Cell::Number(rng.range(0, 90)),
                Cell::Number(rng.range(0, 200)),
                Cell::Number((shares / reach * 10000.0).round() / 100.0),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "圖文",
        &["發布日期", "發布時間", "發布時", "類別", "永久連結", "觸及人數", "按讚數", "分享", "留言數", "珍藏次數", "分享率"],
        &posts,
        date_format,
    )?;

    let stories: Vec<Vec<Cell>> = (0..80)
        .map(|i| {
            let reach = rng.range(100, 4000);
            vec![
                Cell::Date(FIRST_DAY_SERIAL + (i / 2) as f64),
                time_of_day(rng.range(6, 23), rng.range(0, 59)),
                Cell::Number(rng.range(5, 15)),
                Cell::Number(reach),
                Cell::Number(rng.range(0, 300)),
                Cell::Number(rng.range(0, 40)),
                Cell::Number((rng.next_f64() * 500.0).round() / 100.0),
                Cell::Number((rng.next_f64() * 1200.0).round() / 100.0),
            ]
        })
        .collect();
    write_sheet(
        &mut workbook,
        "限時動態",
        &["發布日期", "發布時間", "期間（秒）", "觸及人數", "按讚數", "分享", "分享率", "引導率"],
        &stories,
        date_format,
    )?;

    workbook.save(path).with_context(|| format!("saving {}", path.display()))
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    let fb_path = out_dir.join("FB_all_data.xlsx");
    facebook(&mut rng, &date_format, &fb_path)?;
    let ig_path = out_dir.join("IG_all_data.xlsx");
    instagram(&mut rng, &date_format, &ig_path)?;

    println!("Wrote {} and {}", fb_path.display(), ig_path.display());
    Ok(())
}
