use errlog_elmah::{parse_index, sanitize};

fn synthetic_index(rows: usize) -> String {
    let mut text = String::from(
        "Application,Host,Time,Unix Time,Type,Source,User,Status Code,Message,URL,XMLREF,JSONREF\n",
    );
    for i in 0..rows {
        text.push_str(&format!(
            "/LM/W3SVC/1/ROOT,WEB01,2011-03-01 10:00:00Z,1298973600,System.Exception,App,,500,\
             \"Failure {i}, retry later\",http://h/elmah.axd/detail?id={i},\
             http://h/elmah.axd/xml?id={i},http://h/elmah.axd/json?id={i}\n"
        ));
    }
    text
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn parse_elmah_index(bencher: divan::Bencher, rows: usize) {
    let text = synthetic_index(rows);
    bencher.bench(|| parse_index(divan::black_box(&text)).unwrap());
}

#[divan::bench]
fn sanitize_detail_url() -> String {
    sanitize(divan::black_box(
        "https://www.example.com/elmah.axd/detail?id=7e3c1a2b-5d6f-4e8a-9b0c-1d2e3f4a5b6c",
    ))
}

fn main() {
    divan::main();
}
