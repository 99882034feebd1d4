//! End-to-end tests over a real loopback socket.

use std::sync::Arc;

use gpio_bridge::adapters::sim::SimDriver;
use gpio_bridge::app::service::AppService;
use gpio_bridge::config::SystemConfig;
use gpio_bridge::rpc::engine::RpcEngine;
use gpio_bridge::rpc::server;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct Harness {
    addr: std::net::SocketAddr,
    app: Arc<AppService<SimDriver>>,
    stop: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

async fn start(max_frame_bytes: usize) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Arc::new(AppService::new(SimDriver::new(), &SystemConfig::default()));
    let engine = Arc::new(RpcEngine::new(Arc::clone(&app)));
    let (stop, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(server::serve(listener, engine, max_frame_bytes, async move {
        let _ = rx.await;
    }));

    Harness {
        addr,
        app,
        stop,
        task,
    }
}

async fn read_reply(reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>) -> Value {
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn pipelined_requests_are_answered_in_order() {
    let h = start(1024).await;
    let stream = TcpStream::connect(h.addr).await.unwrap();
    let (rd, mut wr) = stream.into_split();
    let mut reader = BufReader::new(rd);

    wr.write_all(
        b"{\"op\":\"gpio_set\",\"gpio\":17,\"state\":true}\n{\"op\":\"health\"}\n",
    )
    .await
    .unwrap();

    assert_eq!(
        read_reply(&mut reader).await,
        json!({"success": true, "gpio": 17, "state": true})
    );
    let health = read_reply(&mut reader).await;
    assert_eq!(health["status"], json!("healthy"));
    assert_eq!(health["pins"], json!([17]));

    h.stop.send(()).unwrap();
    h.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn oversized_line_is_rejected_and_connection_survives() {
    let h = start(64).await;
    let stream = TcpStream::connect(h.addr).await.unwrap();
    let (rd, mut wr) = stream.into_split();
    let mut reader = BufReader::new(rd);

    let mut big = vec![b'x'; 200];
    big.push(b'\n');
    wr.write_all(&big).await.unwrap();
    wr.write_all(b"{\"op\":\"health\"}\n").await.unwrap();

    let v = read_reply(&mut reader).await;
    assert_eq!(v["success"], json!(false));
    assert_eq!(v["kind"], json!("invalid_parameter"));
    assert_eq!(read_reply(&mut reader).await["success"], json!(true));

    h.stop.send(()).unwrap();
    h.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_then_release() {
    let h = start(1024).await;
    {
        let stream = TcpStream::connect(h.addr).await.unwrap();
        let (rd, mut wr) = stream.into_split();
        let mut reader = BufReader::new(rd);
        wr.write_all(b"{\"op\":\"gpio_pwm\",\"gpio\":18,\"dutyCycle\":50}\n")
            .await
            .unwrap();
        assert_eq!(read_reply(&mut reader).await["success"], json!(true));
    }

    h.stop.send(()).unwrap();
    h.task.await.unwrap().unwrap();
    h.app.shutdown();

    h.app.with_controller(|ctl| {
        assert_eq!(ctl.driver().active_generators(), 0);
        assert_eq!(ctl.driver().releases(), 1);
    });
}
