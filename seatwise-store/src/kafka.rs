use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::topic_partition_list::{Offset, TopicPartitionList};
use rdkafka::util::Timeout;
use tracing::{info, warn};

use seatwise_core::queue::{Delivery, JobSource, QueueMessage, WorkQueue};
use seatwise_core::{CoreError, CoreResult};

fn queue_err(err: rdkafka::error::KafkaError) -> CoreError {
    CoreError::Internal(format!("kafka error: {err}"))
}

/// Kafka-backed producer side of the booking queue. Messages are keyed by
/// `group_key` (the event id), so all requests for one event land on one
/// partition and keep their submission order.
#[derive(Clone)]
pub struct KafkaQueue {
    producer: FutureProducer,
    topic: String,
}

impl KafkaQueue {
    pub fn new(brokers: &str, topic: &str) -> CoreResult<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .set("enable.idempotence", "true")
            .create()
            .map_err(queue_err)?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl WorkQueue for KafkaQueue {
    async fn enqueue(&self, message: QueueMessage) -> CoreResult<()> {
        let record = FutureRecord::to(&self.topic)
            .key(&message.group_key)
            .payload(&message.payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                info!(
                    topic = %self.topic,
                    key = %message.group_key,
                    partition = delivery.partition,
                    offset = delivery.offset,
                    "queued booking request"
                );
                Ok(())
            }
            Err((err, _msg)) => Err(queue_err(err)),
        }
    }
}

/// Consumer side of the booking queue. Offsets are committed manually after
/// processing, one message at a time; a nack seeks the partition back to the
/// message so the broker redelivers it next.
pub struct KafkaJobSource {
    consumer: StreamConsumer,
    topic: String,
}

impl KafkaJobSource {
    pub fn new(brokers: &str, topic: &str, group_id: &str) -> CoreResult<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("max.poll.interval.ms", "300000")
            .create()
            .map_err(queue_err)?;

        consumer.subscribe(&[topic]).map_err(queue_err)?;

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    fn parse_receipt(receipt: &str) -> CoreResult<(i32, i64)> {
        let (partition, offset) = receipt
            .split_once(':')
            .ok_or_else(|| CoreError::Internal(format!("malformed receipt: {receipt}")))?;
        let partition = partition
            .parse()
            .map_err(|_| CoreError::Internal(format!("malformed receipt: {receipt}")))?;
        let offset = offset
            .parse()
            .map_err(|_| CoreError::Internal(format!("malformed receipt: {receipt}")))?;
        Ok((partition, offset))
    }
}

#[async_trait]
impl JobSource for KafkaJobSource {
    async fn next(&self) -> CoreResult<Option<Delivery>> {
        let message = self.consumer.recv().await.map_err(queue_err)?;
        let payload = match message.payload_view::<str>() {
            Some(Ok(payload)) => payload.to_string(),
            Some(Err(_)) | None => {
                warn!(
                    partition = message.partition(),
                    offset = message.offset(),
                    "message without utf-8 payload"
                );
                String::new()
            }
        };

        Ok(Some(Delivery {
            payload,
            receipt: format!("{}:{}", message.partition(), message.offset()),
        }))
    }

    async fn ack(&self, delivery: &Delivery) -> CoreResult<()> {
        let (partition, offset) = Self::parse_receipt(&delivery.receipt)?;
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(&self.topic, partition, Offset::Offset(offset + 1))
            .map_err(queue_err)?;
        self.consumer
            .commit(&tpl, CommitMode::Sync)
            .map_err(queue_err)
    }

    async fn nack(&self, delivery: &Delivery) -> CoreResult<()> {
        let (partition, offset) = Self::parse_receipt(&delivery.receipt)?;
        self.consumer
            .seek(
                &self.topic,
                partition,
                Offset::Offset(offset),
                Duration::from_secs(5),
            )
            .map_err(queue_err)
    }
}
