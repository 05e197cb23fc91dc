use settings::Settings;

use crate::device::DeviceModule;
use crate::meter::MeterModule;
use crate::profile::ProfileClient;
use crate::room::RoomModule;

mod adapter;
mod core;
mod device;
mod meter;
mod profile;
mod room;
mod settings;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");

    settings.monitoring.init().expect("Error initializing monitoring");

    let db_pool = settings.database.new_pool().await.expect("Error initializing database");
    core::persistence::migrate(&db_pool)
        .await
        .expect("Error migrating database");

    let profile = ProfileClient::load(db_pool.clone())
        .await
        .expect("Error loading profile settings");
    let device_module = DeviceModule::new(db_pool.clone())
        .await
        .expect("Error loading devices");
    let room_module = RoomModule::new(db_pool).await.expect("Error loading rooms");
    let meter_module = MeterModule::new(settings.meter.clone(), profile.clone());

    let schedule_exec = {
        let runner = settings
            .schedule
            .enabled
            .then(|| device_module.schedule_runner(settings.schedule.interval));

        async move {
            match runner {
                Some(runner) => runner.run().await,
                None => {
                    tracing::info!("Device schedules are disabled");
                    std::future::pending().await
                }
            }
        }
    };

    let usage_exec = {
        let tracker = settings
            .usage
            .enabled
            .then(|| device_module.usage_tracker(settings.usage.interval));

        async move {
            match tracker {
                Some(tracker) => tracker.run().await,
                None => {
                    tracing::info!("Device usage tracking is disabled");
                    std::future::pending().await
                }
            }
        }
    };

    let http_server_exec = {
        let meter = meter_module.client();
        let devices = device_module.client();
        let rooms = room_module.client();
        let profile = profile.clone();

        async move {
            settings
                .http_server
                .run_server(move || {
                    vec![adapter::api::routes(
                        meter.clone(),
                        devices.clone(),
                        rooms.clone(),
                        profile.clone(),
                    )]
                })
                .await
                .expect("HTTP server execution failed");
        }
    };

    //pending readings are processed before the main loop ends
    let stop_meter = meter_module.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            stop_meter.cancel();
        }
    });

    tracing::info!("Starting main loop");

    tokio::select!(
        res = meter_module.run() => match res {
            Ok(()) => tracing::info!("Meter processing stopped"),
            Err(e) => tracing::error!("Meter processing failed: {:?}", e),
        },
        _ = schedule_exec => {},
        _ = usage_exec => {},
        _ = http_server_exec => {},
    );
}
